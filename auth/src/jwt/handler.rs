use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::SessionClaims;
use super::claims::ValidateClaims;
use super::errors::JwtError;

/// Issuer written into tokens unless configured otherwise.
pub const DEFAULT_ISSUER: &str = "todo-api";

/// Token lifetime unless configured otherwise.
pub const DEFAULT_TTL_MINUTES: i64 = 60;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// JWT token handler for issuing and parsing session tokens.
///
/// Uses HS256 (HMAC with SHA-256). Tokens are self-contained: parsing needs
/// only the secret, the issuer and the clock.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler using HS256, the default issuer and a one hour lifetime
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it once at startup from configuration, never from code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: DEFAULT_ISSUER.to_string(),
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
        }
    }

    /// Set the issuer written into and required from tokens.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the lifetime of issued tokens.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed session token for a user.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `name` - Display name
    /// * `groups` - Authorization groups
    ///
    /// # Returns
    /// Token string and the claims it encodes
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(
        &self,
        user_id: impl ToString,
        name: impl Into<String>,
        groups: Vec<String>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = SessionClaims::for_user(
            user_id,
            name,
            groups,
            self.issuer.clone(),
            Utc::now(),
            self.ttl,
        );
        let token = self.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Parse and validate a session token.
    ///
    /// On top of [`JwtHandler::decode`], rejects a token once its expiration
    /// second has been reached, so it is valid strictly before `exp`.
    ///
    /// # Errors
    /// See [`JwtHandler::decode`].
    pub fn parse(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let claims = self.decode::<SessionClaims>(token)?;

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }

    /// Encode claims into a JWT token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode (must implement Serialize)
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// Checks, in order: structure and signature, `exp` (no leeway) and
    /// `iss`, then the claims type's own [`ValidateClaims`] pass.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match the secret
    /// * `TokenExpired` - Expiration is not in the future
    /// * `MissingClaim` - `exp`, `iss` or `sub` is absent from a claims type
    ///   that tolerates its absence, or the [`ValidateClaims`] pass reports
    ///   an empty field
    /// * `InvalidToken` - Wrong issuer, algorithm or malformed claims
    /// * `DecodingFailed` - Token is not a well-formed JWT, or its payload
    ///   does not deserialize into `T` (for `SessionClaims`, any missing
    ///   field lands here)
    pub fn decode<T>(&self, token: &str) -> Result<T, JwtError>
    where
        T: DeserializeOwned + ValidateClaims,
    {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let token_data =
            decode::<T>(token, &self.decoding_key, &validation).map_err(map_decode_error)?;

        token_data.claims.validate()?;

        Ok(token_data.claims)
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> JwtError {
    match e.kind() {
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        ErrorKind::InvalidIssuer => JwtError::InvalidToken("issuer mismatch".to_string()),
        ErrorKind::InvalidAlgorithm => JwtError::InvalidToken("algorithm mismatch".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
        _ => JwtError::DecodingFailed(e.to_string()),
    }
}
