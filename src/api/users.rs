// SPDX-License-Identifier: AGPL-3.0-or-later

//! Account endpoints for the authenticated caller.

use axum::extract::State;
use axum::Json;

use crate::auth::{Auth, AuthError};
use crate::models::AccountInfo;
use crate::state::AppState;

/// The authenticated caller's account.
///
/// Re-fetched from the store so the response reflects current attributes,
/// not the snapshot captured in the token.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "The caller's account", body = AccountInfo),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
) -> Result<Json<AccountInfo>, AuthError> {
    let account = state
        .store
        .find_by_id(principal.role, principal.account_id)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::AccountNotFound)?;

    Ok(Json(account.into()))
}
