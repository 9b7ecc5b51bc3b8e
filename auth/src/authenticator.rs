use crate::jwt::IssuedToken;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;
use crate::password::HashParams;
use crate::password::HashedPassword;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and JWT token handling. Holds no per-user state.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// Claims encoded in the token
    pub claims: SessionClaims,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    /// Authenticator with default hashing parameters, issuer and token lifetime
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
        }
    }

    /// Create an authenticator from configured parts.
    pub fn from_parts(password_hasher: PasswordHasher, jwt_handler: JwtHandler) -> Self {
        Self {
            password_hasher,
            jwt_handler,
        }
    }

    /// Parameters new password hashes are produced with.
    pub fn password_params(&self) -> &HashParams {
        self.password_hasher.params()
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hash with its salt and parameters
    ///
    /// # Errors
    /// * `PasswordError` - Salt generation or hashing failed
    pub fn hash_password(&self, password: &str) -> Result<HashedPassword, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash in constant time.
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash could not be recomputed
    pub fn verify_password(
        &self,
        password: &str,
        stored: &HashedPassword,
    ) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored)
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored` - Stored password hash
    /// * `user_id` - Subject of the token
    /// * `name` - Display name carried in the token
    /// * `groups` - Authorization groups carried in the token
    ///
    /// # Returns
    /// AuthenticationResult with access token and its claims
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored: &HashedPassword,
        user_id: impl ToString,
        name: impl Into<String>,
        groups: Vec<String>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        // Verify password
        let is_valid = self.password_hasher.verify(password, stored)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        // Generate JWT token
        let IssuedToken { token, claims } = self.jwt_handler.issue(user_id, name, groups)?;

        Ok(AuthenticationResult {
            access_token: token,
            claims,
        })
    }

    /// Generate JWT token without password verification.
    ///
    /// Useful when authentication has already been verified by other means.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token(
        &self,
        user_id: impl ToString,
        name: impl Into<String>,
        groups: Vec<String>,
    ) -> Result<IssuedToken, JwtError> {
        self.jwt_handler.issue(user_id, name, groups)
    }

    /// Validate and decode a session token.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.jwt_handler.parse(token)
    }
}
