// SPDX-License-Identifier: AGPL-3.0-or-later

//! Token verification endpoints.
//!
//! These operate on tokens carried in the request body or query string, not
//! on the `Authorization` header, so other services can verify tokens they
//! hold on a user's behalf.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::{AuthError, Role};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserVerificationRequest {
    pub access_token: String,
}

/// Verification verdict with the account snapshot for a valid token.
///
/// All account fields are absent when `isValid` is false.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserVerificationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expiration: Option<DateTime<Utc>>,
}

impl UserVerificationResponse {
    fn invalid() -> Self {
        Self {
            is_valid: false,
            user_id: None,
            email: None,
            name: None,
            user_type: None,
            is_enabled: None,
            bio: None,
            grade: None,
            classroom: None,
            student_number: None,
            token_expiration: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub token_type: String,
    /// New access-token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ValidateQuery {
    pub token: String,
}

/// Verify an access token and return the account it belongs to.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify/user",
    tag = "Verify",
    request_body = UserVerificationRequest,
    responses(
        (status = 200, description = "Token is valid", body = UserVerificationResponse),
        (status = 401, description = "Token is invalid or expired", body = UserVerificationResponse)
    )
)]
pub async fn verify_user(
    State(state): State<AppState>,
    Json(request): Json<UserVerificationRequest>,
) -> (StatusCode, Json<UserVerificationResponse>) {
    let token = request.access_token.trim();

    if !state.tokens.validate(token) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(UserVerificationResponse::invalid()),
        );
    }

    let claims = match state.tokens.extract_claims(token) {
        Ok(claims) => claims,
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(UserVerificationResponse::invalid()),
            )
        }
    };

    let account = match state.store.find_by_id(claims.role, claims.sub) {
        Ok(Some(account)) => account,
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(UserVerificationResponse::invalid()),
            )
        }
    };

    let response = UserVerificationResponse {
        is_valid: true,
        user_id: Some(account.id),
        email: Some(account.email),
        name: Some(account.name),
        user_type: Some(account.role),
        is_enabled: Some(account.is_enabled),
        bio: account.bio,
        grade: account.grade,
        classroom: account.classroom,
        student_number: account.student_number,
        token_expiration: DateTime::<Utc>::from_timestamp(claims.exp, 0),
    };

    (StatusCode::OK, Json(response))
}

/// Exchange a refresh token for a new access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify/refresh",
    tag = "Verify",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = TokenRefreshResponse),
        (status = 401, description = "Refresh token is invalid or expired")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRefreshRequest>,
) -> Result<Json<TokenRefreshResponse>, AuthError> {
    let access_token = state.tokens.refresh(request.refresh_token.trim())?;

    Ok(Json(TokenRefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.access_ttl_secs(),
    }))
}

/// Lightweight validity probe for a token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/verify/validate",
    tag = "Verify",
    params(ValidateQuery),
    responses(
        (status = 200, description = "Whether the token is currently valid", body = bool)
    )
)]
pub async fn validate_token(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> Json<bool> {
    Json(state.tokens.validate(query.token.trim()))
}
