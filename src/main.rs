// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{env, net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use equiplend_server::api::router;
use equiplend_server::config::AppConfig;
use equiplend_server::state::AppState;
use equiplend_server::storage::RedbAccountStore;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let db_path = config.data_dir.join("accounts.redb");
    let store = RedbAccountStore::open(&db_path).expect("Failed to open account database");

    let state = AppState::new(&config, Arc::new(store));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(%addr, db = %db_path.display(), "Equiplend server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if env::var("LOG_FORMAT").as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
