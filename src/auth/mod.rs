// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Authentication Module
//!
//! Identity and session management for the Equiplend API.
//!
//! ## Login Flow
//!
//! 1. Client calls `GET /api/v1/auth/google/login` and redirects the user to
//!    the returned Google authorization URL (with an anti-forgery `state`)
//! 2. Google redirects back with an authorization code
//! 3. The callback endpoint exchanges the code for a Google access token,
//!    fetches the user profile, and enforces the school domain allow-list
//! 4. The external identity is resolved to a local account (created as a
//!    student with default attributes on first login)
//! 5. The server issues its own JWT access/refresh token pair
//!
//! ## Session Flow
//!
//! Subsequent requests send `Authorization: Bearer <access token>`. The
//! request authenticator validates the token, resolves the account by
//! `(role, id)`, and attaches a [`Principal`] to the request. A missing or
//! invalid token never fails the request here; the request simply stays
//! anonymous and authorization is decided per endpoint.
//!
//! ## Security
//!
//! - Tokens are HS256-signed with a symmetric key from configuration
//! - Signature/structure failures are distinguished from expiry so callers
//!   can report them separately
//! - Refresh tokens are not rotated on use (see DESIGN.md)

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod google;
pub mod identity;
pub mod login;
pub mod middleware;
pub mod roles;
pub mod tokens;

pub use claims::{Principal, TokenClaims, TokenKind};
pub use codec::TokenCodec;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use google::{GoogleOAuthClient, GoogleOAuthError};
pub use identity::IdentityResolver;
pub use login::GoogleLoginService;
pub use roles::Role;
pub use tokens::{TokenPair, TokenService};
