// SPDX-License-Identifier: AGPL-3.0-or-later

//! Token claims and the authenticated request principal.

use serde::{Deserialize, Serialize};

use super::roles::Role;

/// Discriminator for the two token kinds issued by this service.
///
/// Access tokens have a short lifetime and authorize API calls; refresh
/// tokens have a long lifetime and are accepted only by the refresh endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in an issued token.
///
/// Immutable once constructed; a renewed token is a freshly signed artifact.
/// Expiry is always `iat` plus the configured window for the token kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject account id
    pub sub: i64,
    /// Account role at issuance
    pub role: Role,
    /// Account email at issuance
    pub email: String,
    /// Issued-at timestamp (Unix seconds)
    pub iat: i64,
    /// Expiry timestamp (Unix seconds)
    pub exp: i64,
    /// Token kind discriminator
    pub kind: TokenKind,
}

/// The resolved, authenticated caller attached to a request.
///
/// Exactly one principal is attached per request, by the request
/// authenticator middleware. Handlers receive it through the
/// [`Auth`](super::extractor::Auth) extractor; requests without a valid
/// bearer token simply carry no principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: i64,
    pub role: Role,
    pub email: String,
}
