//! Authentication utilities library
//!
//! Provides the credential and session primitives used by the user service:
//! - Password hashing (Argon2id, parameters stored with each hash)
//! - Constant-time password verification
//! - Signed session tokens (JWT, HS256) with post-decode claims validation
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashParams, PasswordHasher};
//!
//! let hasher = PasswordHasher::with_params(HashParams::new(1024, 1, 1).unwrap());
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::JwtHandler;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let issued = handler.issue("user123", "Alice", vec!["project.read".to_string()]).unwrap();
//! let claims = handler.parse(&issued.token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, HashParams, JwtHandler, PasswordHasher};
//!
//! let auth = Authenticator::from_parts(
//!     PasswordHasher::with_params(HashParams::new(1024, 1, 1).unwrap()),
//!     JwtHandler::new(b"secret_key_at_least_32_bytes_long!"),
//! );
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth
//!     .authenticate("password123", &hash, "user123", "Alice", vec![])
//!     .unwrap();
//! println!("Token: {}", result.access_token);
//!
//! // Validate token
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.name, "Alice");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use jwt::ValidateClaims;
pub use password::HashParams;
pub use password::HashedPassword;
pub use password::PasswordError;
pub use password::PasswordHasher;
