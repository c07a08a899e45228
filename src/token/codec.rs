use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{Claims, Purpose};
use crate::crypto::SecretString;
use crate::AuthError;

/// The single failure kind the codec reports.
///
/// A bad signature, a malformed token, and an expired token are deliberately
/// indistinguishable: callers (and attackers reading their responses) learn
/// only that the token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidToken;

impl std::error::Error for InvalidToken {}

impl fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid token")
    }
}

/// Signs and verifies compact expiring tokens carrying a subject and a
/// purpose tag.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Creates a codec signing with the given secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` for non-HMAC algorithms; the
    /// codec keys off a shared secret, not a keypair.
    pub fn new(secret: &SecretString, algorithm: Algorithm) -> Result<Self, AuthError> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {}
            other => {
                return Err(AuthError::Configuration(format!(
                    "unsupported signing algorithm {other:?}, expected an HMAC variant"
                )))
            }
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        })
    }

    /// Issues a signed token for `subject` expiring `ttl` from now.
    pub fn issue(
        &self,
        subject: &str,
        purpose: Purpose,
        ttl: Duration,
    ) -> Result<String, InvalidToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_owned(),
            purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|_| InvalidToken)
    }

    /// Decodes and validates a token, returning its claims.
    ///
    /// Fails with [`InvalidToken`] when the signature does not verify, the
    /// structure is malformed, or the expiry has passed. Expiry is checked
    /// with zero leeway: a token is invalid at `exp`, not shortly after.
    pub fn decode(&self, token: &str) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| InvalidToken)?;

        // The library's expiry check is exclusive (exp < now); close the
        // boundary so a token is already invalid at exp itself.
        if Utc::now().timestamp() >= claims.exp {
            return Err(InvalidToken);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
