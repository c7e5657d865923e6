// file: src/auth/token.rs
// description: HS256 JWT minting from a base64 pre-shared key
// reference: https://docs.rs/jsonwebtoken

use super::TokenSource;
use crate::config::AuthConfig;
use crate::error::TokenError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Signs short-lived tokens with the key Clair is configured to trust.
/// The key is decoded on every call so a bad key fails the token stage of
/// each pipeline rather than the whole process.
#[derive(Clone)]
pub struct PskTokenSource {
    psk: String,
    issuer: String,
    lifetime: Duration,
}

impl PskTokenSource {
    pub fn new(psk: impl Into<String>, config: &AuthConfig) -> Self {
        Self {
            psk: psk.into(),
            issuer: config.issuer.clone(),
            lifetime: config.token_lifetime,
        }
    }

    fn claims(&self) -> Claims {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX / 2);
        Claims {
            iss: self.issuer.clone(),
            iat: now,
            nbf: now,
            exp: now.saturating_add(lifetime),
        }
    }
}

impl std::fmt::Debug for PskTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PskTokenSource")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenSource for PskTokenSource {
    fn token(&self) -> Result<String, TokenError> {
        if self.psk.is_empty() {
            return Err(TokenError::EmptyKey);
        }
        let key = STANDARD.decode(self.psk.trim())?;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &self.claims(),
            &EncodingKey::from_secret(&key),
        )?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    fn auth_config() -> AuthConfig {
        AuthConfig {
            issuer: "clairctl".to_string(),
            token_lifetime: Duration::from_secs(600),
        }
    }

    #[test]
    fn test_token_verifies_with_decoded_key() {
        let key = b"super secret key material";
        let psk = STANDARD.encode(key);
        let source = PskTokenSource::new(psk, &auth_config());

        let token = source.token().unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&["clairctl"]);
        let decoded =
            decode::<Claims>(&token, &DecodingKey::from_secret(key), &validation).unwrap();
        assert_eq!(decoded.claims.iss, "clairctl");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 600);
    }

    #[test]
    fn test_invalid_base64_key() {
        let source = PskTokenSource::new("not base64!!", &auth_config());
        assert!(matches!(source.token(), Err(TokenError::InvalidKey(_))));
    }

    #[test]
    fn test_empty_key() {
        let source = PskTokenSource::new("", &auth_config());
        assert!(matches!(source.token(), Err(TokenError::EmptyKey)));
    }

    #[test]
    fn test_debug_hides_key() {
        let source = PskTokenSource::new("c2VjcmV0", &auth_config());
        assert!(!format!("{source:?}").contains("c2VjcmV0"));
    }
}
