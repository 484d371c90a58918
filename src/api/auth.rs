// SPDX-License-Identifier: AGPL-3.0-or-later

//! Google OAuth login endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::AuthError;
use crate::models::AuthResponse;
use crate::state::AppState;

/// The authorization URL the client should redirect the browser to.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUrlResponse {
    pub auth_url: String,
}

/// OAuth callback parameters relayed by the client.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct GoogleCallbackRequest {
    /// Authorization code issued by Google
    pub code: String,
    /// Anti-forgery state echoed back by Google
    #[serde(default)]
    #[allow(dead_code)]
    pub state: Option<String>,
}

/// Start a Google login.
#[utoipa::path(
    get,
    path = "/api/v1/auth/google/login",
    tag = "Auth",
    responses(
        (status = 200, description = "Authorization URL to redirect to", body = LoginUrlResponse)
    )
)]
pub async fn google_login(
    State(state): State<AppState>,
) -> Result<Json<LoginUrlResponse>, AuthError> {
    let auth_url = state.login.authorization_url()?;
    Ok(Json(LoginUrlResponse { auth_url }))
}

/// Complete a Google login from a relayed callback.
#[utoipa::path(
    post,
    path = "/api/v1/auth/google/callback",
    tag = "Auth",
    request_body = GoogleCallbackRequest,
    responses(
        (status = 200, description = "Login succeeded, session tokens issued", body = AuthResponse),
        (status = 401, description = "Authentication failed")
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    Json(request): Json<GoogleCallbackRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.login.authenticate(&request.code).await?;
    Ok(Json(response))
}

/// Complete a Google login from a direct browser redirect.
#[utoipa::path(
    get,
    path = "/api/v1/auth/google/callback",
    tag = "Auth",
    params(GoogleCallbackRequest),
    responses(
        (status = 200, description = "Login succeeded, session tokens issued", body = AuthResponse),
        (status = 401, description = "Authentication failed")
    )
)]
pub async fn google_callback_redirect(
    State(state): State<AppState>,
    Query(request): Query<GoogleCallbackRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.login.authenticate(&request.code).await?;
    Ok(Json(response))
}
