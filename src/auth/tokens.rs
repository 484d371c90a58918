// SPDX-License-Identifier: AGPL-3.0-or-later

//! Token issuance, validation, and refresh.

use std::sync::Arc;

use chrono::Utc;

use super::claims::{TokenClaims, TokenKind};
use super::codec::TokenCodec;
use super::error::AuthError;
use super::roles::Role;
use crate::config::JwtConfig;

/// An issued access/refresh token pair.
///
/// `expires_in` is the access-token lifetime in seconds, for client-side
/// refresh scheduling.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Issues and validates the service's own JWT session tokens.
///
/// Stateless across requests; cheap to clone and share.
#[derive(Clone)]
pub struct TokenService {
    codec: Arc<TokenCodec>,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            codec: Arc::new(TokenCodec::new(config.secret.as_bytes())),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    /// Access-token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Issue a short-lived access token.
    pub fn issue_access_token(
        &self,
        account_id: i64,
        role: Role,
        email: &str,
    ) -> Result<String, AuthError> {
        self.issue(TokenKind::Access, self.access_ttl_secs, account_id, role, email)
    }

    /// Issue a long-lived refresh token.
    pub fn issue_refresh_token(
        &self,
        account_id: i64,
        role: Role,
        email: &str,
    ) -> Result<String, AuthError> {
        self.issue(TokenKind::Refresh, self.refresh_ttl_secs, account_id, role, email)
    }

    /// Issue both tokens for an account.
    pub fn issue_pair(
        &self,
        account_id: i64,
        role: Role,
        email: &str,
    ) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(account_id, role, email)?,
            refresh_token: self.issue_refresh_token(account_id, role, email)?,
            token_type: "Bearer",
            expires_in: self.access_ttl_secs,
        })
    }

    fn issue(
        &self,
        kind: TokenKind,
        ttl_secs: i64,
        account_id: i64,
        role: Role,
        email: &str,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: account_id,
            role,
            email: email.to_string(),
            iat: now,
            exp: now + ttl_secs,
            kind,
        };
        self.codec.encode(&claims)
    }

    /// Cheap pre-check: true iff the token decodes under the current key AND
    /// the current time is before its expiry. Never errors.
    pub fn validate(&self, token: &str) -> bool {
        match self.codec.decode(token) {
            Ok(claims) => Utc::now().timestamp() < claims.exp,
            Err(_) => false,
        }
    }

    /// Extract the claims without checking expiry (mirrors the codec's
    /// separation of signature and temporal validity).
    pub fn extract_claims(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.codec.decode(token)
    }

    /// True if the token's expiry is in the past. Unreadable tokens count as
    /// expired (fail safe).
    pub fn is_expired(&self, token: &str) -> bool {
        match self.codec.decode(token) {
            Ok(claims) => claims.exp <= Utc::now().timestamp(),
            Err(_) => true,
        }
    }

    /// Exchange a valid refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated or invalidated; it stays
    /// usable for its whole lifetime (see DESIGN.md).
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        if !self.validate(refresh_token) {
            return Err(AuthError::InvalidRefreshToken);
        }

        let claims = self
            .extract_claims(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::InvalidRefreshToken);
        }

        self.issue_access_token(claims.sub, claims.role, &claims.email)
    }
}
