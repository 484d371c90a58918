// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::authenticate_request,
    models::{AccountInfo, AuthResponse},
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod users;
pub mod verify;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/google/login", get(auth::google_login))
        .route(
            "/auth/google/callback",
            post(auth::google_callback).get(auth::google_callback_redirect),
        )
        .route("/auth/verify/user", post(verify::verify_user))
        .route("/auth/verify/refresh", post(verify::refresh_token))
        .route("/auth/verify/validate", get(verify::validate_token))
        .route("/users/me", get(users::current_user));

    Router::new()
        .nest("/api/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .layer(from_fn_with_state(state.clone(), authenticate_request))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::google_login,
        auth::google_callback,
        auth::google_callback_redirect,
        verify::verify_user,
        verify::refresh_token,
        verify::validate_token,
        users::current_user,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AccountInfo,
            AuthResponse,
            auth::LoginUrlResponse,
            auth::GoogleCallbackRequest,
            verify::UserVerificationRequest,
            verify::UserVerificationResponse,
            verify::TokenRefreshRequest,
            verify::TokenRefreshResponse,
            health::ReadyResponse,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Google OAuth login"),
        (name = "Verify", description = "Token verification and refresh"),
        (name = "Users", description = "Authenticated account access"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
