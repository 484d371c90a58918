// SPDX-License-Identifier: AGPL-3.0-or-later

//! Axum extractor for authenticated requests.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is the authenticated account
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, Principal};
use crate::state::AppState;

/// Extractor that requires an authenticated principal.
///
/// Prefers the principal attached by the authentication middleware; if the
/// middleware did not run (as in isolated handler tests) it falls back to
/// validating the bearer token itself and rejects with the precise failure.
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>().cloned() {
            return Ok(Auth(principal));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        let claims = state.tokens.extract_claims(token)?;
        if state.tokens.is_expired(token) {
            return Err(AuthError::TokenExpired);
        }

        let account = state
            .store
            .find_by_id(claims.role, claims.sub)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::AccountNotFound)?;

        Ok(Auth(Principal {
            account_id: account.id,
            role: account.role,
            email: account.email,
        }))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` instead of rejecting, for routes that serve both anonymous
/// and authenticated callers.
pub struct OptionalAuth(pub Option<Principal>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(principal)) => Ok(OptionalAuth(Some(principal))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::config::{AppConfig, GoogleOAuthConfig, JwtConfig, NewStudentDefaults};
    use crate::models::NewAccount;
    use crate::storage::{AccountStore, MemoryAccountStore};
    use axum::http::Request;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn test_config(access_ttl_secs: i64) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            data_dir: PathBuf::from("/tmp"),
            google: GoogleOAuthConfig {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                redirect_uri: "http://localhost/callback".to_string(),
                allowed_domain: "sdh.hs.kr".to_string(),
                token_endpoint: "http://localhost/token".to_string(),
                userinfo_endpoint: "http://localhost/userinfo".to_string(),
            },
            jwt: JwtConfig {
                secret: "extractor-test-secret".to_string(),
                access_ttl_secs,
                refresh_ttl_secs: 7200,
            },
            student_defaults: NewStudentDefaults::default(),
        }
    }

    fn create_test_state(access_ttl_secs: i64) -> (AppState, i64) {
        let store = Arc::new(MemoryAccountStore::new());
        let account = store
            .save(NewAccount {
                email: "student@sdh.hs.kr".to_string(),
                name: "Student".to_string(),
                role: Role::Student,
                is_enabled: true,
                bio: None,
                grade: Some(1),
                classroom: Some(1),
                student_number: Some(1),
            })
            .unwrap();
        (AppState::new(&test_config(access_ttl_secs), store), account.id)
    }

    fn parts_with_header(header: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _) = create_test_state(3600);
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_scheme() {
        let (state, _) = create_test_state(3600);
        let mut parts = parts_with_header(Some("Basic dXNlcg==".to_string()));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_valid_token() {
        let (state, id) = create_test_state(3600);
        let token = state
            .tokens
            .issue_access_token(id, Role::Student, "student@sdh.hs.kr")
            .unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));

        let Auth(principal) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(principal.account_id, id);
        assert_eq!(principal.role, Role::Student);
    }

    #[tokio::test]
    async fn auth_extractor_rejects_expired_token() {
        let (state, id) = create_test_state(0);
        let token = state
            .tokens
            .issue_access_token(id, Role::Student, "student@sdh.hs.kr")
            .unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_unknown_account() {
        let (state, _) = create_test_state(3600);
        let token = state
            .tokens
            .issue_access_token(999, Role::Teacher, "ghost@sdh.hs.kr")
            .unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::AccountNotFound)));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _) = create_test_state(3600);
        let mut parts = parts_with_header(None);
        parts.extensions.insert(Principal {
            account_id: 42,
            role: Role::Teacher,
            email: "teacher@sdh.hs.kr".to_string(),
        });

        let Auth(principal) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(principal.account_id, 42);
        assert_eq!(principal.role, Role::Teacher);
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_credentials() {
        let (state, _) = create_test_state(3600);
        let mut parts = parts_with_header(None);

        let OptionalAuth(principal) =
            OptionalAuth::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(principal.is_none());
    }
}
