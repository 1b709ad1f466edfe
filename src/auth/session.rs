//! Session token issuance and verification
//!
//! Session tokens are HS256 JWTs carrying the caller's email. They have no
//! expiry: a token is valid for as long as the server keeps the secret it
//! was signed with.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::AuthError;
use crate::models::{Identity, SessionClaims};

/// Issues and verifies bearer session tokens
///
/// Constructed once at startup from the configured secret and shared behind
/// an `Arc`.
#[derive(Clone)]
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionTokenService {
    /// Create a token service for the given signing secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry only `email` (and `iat`); no registered claim is required
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a signed token for an identity
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let claims = SessionClaims::for_identity(identity);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify a token and return the identity it asserts
    ///
    /// Every failure (malformed token, bad signature, other algorithm,
    /// missing email) is reported as `AuthError::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                tracing::debug!(error = %e, "Session token rejected");
                AuthError::InvalidToken
            },
        )?;

        Ok(data.claims.into())
    }
}

impl std::fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}
