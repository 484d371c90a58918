// SPDX-License-Identifier: AGPL-3.0-or-later

//! Login orchestration: code exchange, profile fetch, account resolution,
//! and session-token issuance as one pipeline.
//!
//! Failure details are logged but never leak to the client; every stage
//! collapses into [`AuthError::AuthenticationFailed`].

use tracing::warn;

use crate::auth::error::AuthError;
use crate::auth::google::GoogleOAuthClient;
use crate::auth::identity::IdentityResolver;
use crate::auth::tokens::TokenService;
use crate::models::AuthResponse;

#[derive(Clone)]
pub struct GoogleLoginService {
    oauth: GoogleOAuthClient,
    resolver: IdentityResolver,
    tokens: TokenService,
}

impl GoogleLoginService {
    pub fn new(oauth: GoogleOAuthClient, resolver: IdentityResolver, tokens: TokenService) -> Self {
        Self {
            oauth,
            resolver,
            tokens,
        }
    }

    /// The Google authorization URL to redirect the browser to.
    pub fn authorization_url(&self) -> Result<String, AuthError> {
        self.oauth.authorization_url().map_err(|e| {
            warn!(error = %e, "failed to build authorization URL");
            AuthError::Internal(e.to_string())
        })
    }

    /// Complete a login from the OAuth callback code.
    ///
    /// The tokens in the response are self-issued session tokens; Google's
    /// tokens are consumed here and never returned to the client.
    pub async fn authenticate(&self, code: &str) -> Result<AuthResponse, AuthError> {
        let grant = self.oauth.exchange_code(code).await.map_err(|e| {
            warn!(error = %e, "authorization code exchange failed");
            AuthError::AuthenticationFailed
        })?;

        let google_token = grant.access_token.as_deref().unwrap_or_default();
        let identity = self.oauth.fetch_profile(google_token).await.map_err(|e| {
            warn!(error = %e, "profile fetch failed");
            AuthError::AuthenticationFailed
        })?;

        let account = self.resolver.resolve(&identity).map_err(|e| {
            warn!(error = %e, "account resolution failed");
            AuthError::AuthenticationFailed
        })?;

        let pair = self
            .tokens
            .issue_pair(account.id, account.role, &account.email)?;

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type.to_string(),
            expires_in: pair.expires_in,
            user_info: account.into(),
        })
    }
}
