// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shared application state.

use std::sync::Arc;

use crate::auth::{GoogleLoginService, GoogleOAuthClient, IdentityResolver, TokenService};
use crate::config::AppConfig;
use crate::storage::AccountStore;

/// State shared by all request handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub tokens: TokenService,
    pub login: GoogleLoginService,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<dyn AccountStore>) -> Self {
        let tokens = TokenService::new(&config.jwt);
        let oauth = GoogleOAuthClient::new(&config.google);
        let resolver = IdentityResolver::new(store.clone(), config.student_defaults.clone());
        let login = GoogleLoginService::new(oauth, resolver, tokens.clone());

        Self {
            store,
            tokens,
            login,
        }
    }
}
