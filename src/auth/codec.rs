// SPDX-License-Identifier: AGPL-3.0-or-later

//! Signed token encoding and decoding.
//!
//! The codec only vouches for structure and signature. Expiry is deliberately
//! NOT checked here so that signature validity and temporal validity stay
//! distinguishable failure modes; [`TokenService`](super::tokens::TokenService)
//! owns the expiry check.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::TokenClaims;
use super::error::AuthError;

/// HS256 codec over a symmetric key loaded from configuration.
///
/// Swapping the key is a configuration change; the codec is rebuilt at
/// startup from whatever secret the configuration provides.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec signing with the given symmetric secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is the TokenService's concern, not the codec's.
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Encode and sign a claim set.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))
    }

    /// Decode a token, verifying structure and signature only.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            },
        )?;

        Ok(data.claims)
    }
}
