// SPDX-License-Identifier: AGPL-3.0-or-later

//! Google OAuth exchange: authorization URL, code-for-token exchange, and
//! profile fetch with the school domain allow-list.
//!
//! The exchange is three linear stages with no backward transitions: build
//! the redirect, exchange the code, fetch the profile. The domain check runs
//! inside the profile stage, before any account is looked up or created.

use std::time::Duration;

use reqwest::Client;
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::config::GoogleOAuthConfig;
use crate::models::ExternalIdentity;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const OAUTH_SCOPES: &str = "openid profile email";

/// Anti-forgery state length in random bytes (hex-encoded to twice this).
const STATE_BYTES: usize = 32;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum GoogleOAuthError {
    #[error("token exchange with Google failed: {0}")]
    TokenRequest(String),

    #[error("Google profile request failed: {0}")]
    ProfileRequest(String),

    #[error("account domain {0:?} is not allowed")]
    DomainNotAllowed(String),

    #[error("failed to generate authorization state")]
    StateGeneration,

    #[error("authorization URL construction failed: {0}")]
    UrlConstruction(String),
}

/// Google's response to the authorization-code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenGrant {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Profile returned by Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
struct GoogleUserProfile {
    id: String,
    email: String,
    #[serde(default)]
    verified_email: bool,
    name: String,
    /// Hosted (organizational) domain claim; absent for personal accounts
    #[serde(default)]
    hd: Option<String>,
}

/// Client for the Google OAuth endpoints.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    allowed_domain: String,
    token_endpoint: String,
    userinfo_endpoint: String,
    http: Client,
    rng: SystemRandom,
}

impl GoogleOAuthClient {
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            allowed_domain: config.allowed_domain.clone(),
            token_endpoint: config.token_endpoint.clone(),
            userinfo_endpoint: config.userinfo_endpoint.clone(),
            http: Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            rng: SystemRandom::new(),
        }
    }

    /// Build the authorization redirect URL with a fresh anti-forgery state.
    ///
    /// Issued states are not persisted server-side, so the callback cannot
    /// verify them against this instance (known limitation, see DESIGN.md).
    pub fn authorization_url(&self) -> Result<String, GoogleOAuthError> {
        let state = self.generate_state()?;
        let url = Url::parse_with_params(
            AUTHORIZATION_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", OAUTH_SCOPES),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| GoogleOAuthError::UrlConstruction(e.to_string()))?;

        Ok(url.into())
    }

    /// Exchange an authorization code for Google tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokenGrant, GoogleOAuthError> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GoogleOAuthError::TokenRequest(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleOAuthError::TokenRequest(format!(
                "HTTP {} from token endpoint",
                response.status()
            )));
        }

        let grant: GoogleTokenGrant = response
            .json()
            .await
            .map_err(|e| GoogleOAuthError::TokenRequest(e.to_string()))?;

        if grant.access_token.as_deref().unwrap_or_default().is_empty() {
            return Err(GoogleOAuthError::TokenRequest(
                "missing access token in response body".to_string(),
            ));
        }

        Ok(grant)
    }

    /// Fetch the user's profile and enforce the domain allow-list.
    pub async fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Result<ExternalIdentity, GoogleOAuthError> {
        let response = self
            .http
            .get(&self.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleOAuthError::ProfileRequest(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleOAuthError::ProfileRequest(format!(
                "HTTP {} from userinfo endpoint",
                response.status()
            )));
        }

        let profile: GoogleUserProfile = response
            .json()
            .await
            .map_err(|e| GoogleOAuthError::ProfileRequest(e.to_string()))?;

        self.enforce_domain(&profile)?;

        Ok(ExternalIdentity {
            provider_id: profile.id,
            email: profile.email,
            verified_email: profile.verified_email,
            name: profile.name,
        })
    }

    /// The profile's hosted-domain claim must equal the configured school
    /// domain. Runs before any account is touched.
    fn enforce_domain(&self, profile: &GoogleUserProfile) -> Result<(), GoogleOAuthError> {
        let domain = profile.hd.as_deref().unwrap_or_default();
        if domain != self.allowed_domain {
            warn!(email = %profile.email, domain, "login rejected by domain allow-list");
            return Err(GoogleOAuthError::DomainNotAllowed(domain.to_string()));
        }
        Ok(())
    }

    fn generate_state(&self) -> Result<String, GoogleOAuthError> {
        let mut bytes = [0u8; STATE_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| GoogleOAuthError::StateGeneration)?;
        Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret-456".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            allowed_domain: "sdh.hs.kr".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_endpoint: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }

    fn profile(email: &str, hd: Option<&str>) -> GoogleUserProfile {
        GoogleUserProfile {
            id: "google-1".to_string(),
            email: email.to_string(),
            verified_email: true,
            name: "Some User".to_string(),
            hd: hd.map(str::to_string),
        }
    }

    #[test]
    fn authorization_url_carries_oauth_parameters() {
        let client = GoogleOAuthClient::new(&test_config());
        let url = Url::parse(&client.authorization_url().unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let params: std::collections::HashMap<_, _> = url.query_pairs().collect();
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["scope"], OAUTH_SCOPES);

        let state = &params["state"];
        assert_eq!(state.len(), STATE_BYTES * 2);
        assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn each_login_attempt_gets_a_fresh_state() {
        let client = GoogleOAuthClient::new(&test_config());
        let first = client.authorization_url().unwrap();
        let second = client.authorization_url().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn domain_allow_list_rejects_other_domains() {
        let client = GoogleOAuthClient::new(&test_config());

        assert!(client
            .enforce_domain(&profile("user@sdh.hs.kr", Some("sdh.hs.kr")))
            .is_ok());
        assert!(matches!(
            client.enforce_domain(&profile("user@other.org", Some("other.org"))),
            Err(GoogleOAuthError::DomainNotAllowed(_))
        ));
        // Personal accounts have no hosted-domain claim at all
        assert!(matches!(
            client.enforce_domain(&profile("user@gmail.com", None)),
            Err(GoogleOAuthError::DomainNotAllowed(_))
        ));
    }
}
