// SPDX-License-Identifier: AGPL-3.0-or-later

//! Request authentication middleware.
//!
//! Runs on every request. A valid bearer token whose account still exists
//! attaches a [`Principal`] to the request's extensions; anything else (no
//! header, malformed, expired, unknown account) leaves the request
//! anonymous and lets the route decide whether that is acceptable.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::auth::claims::Principal;
use crate::state::AppState;

pub async fn authenticate_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(principal) = resolve_principal(&state, request.headers()) {
        request.extensions_mut().insert(principal);
    }
    next.run(request).await
}

/// Resolve a bearer token from the headers into a live principal.
///
/// Never fails the request; the value is `None` for anonymous or invalid
/// credentials.
pub(crate) fn resolve_principal(state: &AppState, headers: &HeaderMap) -> Option<Principal> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if !state.tokens.validate(token) {
        warn!("rejecting invalid or expired bearer token");
        return None;
    }

    let claims = state.tokens.extract_claims(token).ok()?;

    match state.store.find_by_id(claims.role, claims.sub) {
        Ok(Some(account)) => Some(Principal {
            account_id: account.id,
            role: account.role,
            email: account.email,
        }),
        Ok(None) => {
            warn!(account_id = claims.sub, "token subject no longer exists");
            None
        }
        Err(e) => {
            warn!(error = %e, "account lookup failed during authentication");
            None
        }
    }
}
