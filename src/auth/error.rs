// SPDX-License-Identifier: AGPL-3.0-or-later

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// All of these are per-request and recoverable by the client (re-login or
/// retry); none are fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Token is structurally invalid
    #[error("Token is malformed")]
    MalformedToken,
    /// Token signature is invalid
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Token is structurally valid but past its expiry
    #[error("Token has expired")]
    TokenExpired,
    /// Refresh token is invalid, expired, or not a refresh token
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    /// No account matches the token's subject
    #[error("Account not found")]
    AccountNotFound,
    /// An account with the same email already exists
    #[error("An account with this email already exists")]
    DuplicateAccount,
    /// Umbrella for any OAuth login stage failure; the internal cause is
    /// logged, never exposed to the client
    #[error("Google authentication failed")]
    AuthenticationFailed,
    /// Internal error
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidRefreshToken => "invalid_refresh_token",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::DuplicateAccount => "duplicate_account",
            AuthError::AuthenticationFailed => "authentication_failed",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::InvalidRefreshToken
            | AuthError::AccountNotFound
            | AuthError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateAccount => StatusCode::CONFLICT,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn token_errors_return_401() {
        let response = AuthError::InvalidRefreshToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "invalid_refresh_token");
    }

    #[tokio::test]
    async fn duplicate_account_returns_409() {
        let response = AuthError::DuplicateAccount.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn authentication_failed_hides_detail() {
        // Generic message only; the stage that failed stays in the logs.
        assert_eq!(
            AuthError::AuthenticationFailed.to_string(),
            "Google authentication failed"
        );
    }
}
