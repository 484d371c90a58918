// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory for the embedded account database | `/data` |
//! | `GOOGLE_CLIENT_ID` | OAuth client id | Required |
//! | `GOOGLE_CLIENT_SECRET` | OAuth client secret | Required |
//! | `GOOGLE_REDIRECT_URI` | OAuth redirect URI | Required |
//! | `ALLOWED_EMAIL_DOMAIN` | Enforced organizational domain | `sdh.hs.kr` |
//! | `JWT_SECRET` | Symmetric token signing key | Dev-only fallback |
//! | `JWT_ACCESS_TTL_SECS` | Access-token lifetime | `86400` (24h) |
//! | `JWT_REFRESH_TTL_SECS` | Refresh-token lifetime | `604800` (7d) |
//! | `STUDENT_DEFAULT_BIO` | Bio for auto-created students | `student` |
//! | `STUDENT_DEFAULT_GRADE` | Grade for auto-created students | `1` |
//! | `STUDENT_DEFAULT_CLASSROOM` | Classroom for auto-created students | `1` |
//! | `STUDENT_DEFAULT_NUMBER` | Number for auto-created students | `1` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Development-only signing key used when `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "change-me-development-only-secret";

const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const DEFAULT_ALLOWED_DOMAIN: &str = "sdh.hs.kr";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(String),

    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: String, value: String },
}

/// Google OAuth client settings.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Organizational domain allow-list; profiles from any other domain are
    /// rejected before account resolution.
    pub allowed_domain: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

/// Token signing and lifetime settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

/// Attributes given to accounts auto-created on first login.
///
/// A policy hook: a deployment can change these without a code change.
#[derive(Debug, Clone)]
pub struct NewStudentDefaults {
    pub bio: String,
    pub grade: i32,
    pub classroom: i32,
    pub student_number: i32,
}

impl Default for NewStudentDefaults {
    fn default() -> Self {
        Self {
            bio: "student".to_string(),
            grade: 1,
            classroom: 1,
            student_number: 1,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub google: GoogleOAuthConfig,
    pub jwt: JwtConfig,
    pub student_defaults: NewStudentDefaults,
}

impl AppConfig {
    /// Load the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                warn!("JWT_SECRET is not set; using a development-only signing key");
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            host: env_or_default("HOST", "0.0.0.0"),
            port: env_parse_or_default("PORT", 8080)?,
            data_dir: PathBuf::from(env_or_default(DATA_DIR_ENV, "/data")),
            google: GoogleOAuthConfig {
                client_id: env_required("GOOGLE_CLIENT_ID")?,
                client_secret: env_required("GOOGLE_CLIENT_SECRET")?,
                redirect_uri: env_required("GOOGLE_REDIRECT_URI")?,
                allowed_domain: env_or_default("ALLOWED_EMAIL_DOMAIN", DEFAULT_ALLOWED_DOMAIN),
                token_endpoint: env_or_default("GOOGLE_TOKEN_ENDPOINT", DEFAULT_TOKEN_ENDPOINT),
                userinfo_endpoint: env_or_default(
                    "GOOGLE_USERINFO_ENDPOINT",
                    DEFAULT_USERINFO_ENDPOINT,
                ),
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl_secs: env_parse_or_default("JWT_ACCESS_TTL_SECS", 86_400)?,
                refresh_ttl_secs: env_parse_or_default("JWT_REFRESH_TTL_SECS", 604_800)?,
            },
            student_defaults: NewStudentDefaults {
                bio: env_or_default("STUDENT_DEFAULT_BIO", "student"),
                grade: env_parse_or_default("STUDENT_DEFAULT_GRADE", 1)?,
                classroom: env_parse_or_default("STUDENT_DEFAULT_CLASSROOM", 1)?,
                student_number: env_parse_or_default("STUDENT_DEFAULT_NUMBER", 1)?,
            },
        })
    }
}

fn env_required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or_default<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidVar {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
