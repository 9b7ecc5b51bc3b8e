use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::password_hash::Output;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Version;

use super::errors::PasswordError;
use super::hash::HashParams;
use super::hash::HashedPassword;
use super::hash::HASH_LEN;
use super::hash::SALT_LEN;

/// Password hashing implementation.
///
/// Derives Argon2id keys from a fresh random salt and verifies them with a
/// constant-time comparison. Hashing is CPU and memory bound; async callers
/// should run it on a blocking thread.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: HashParams,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher configured with the default 64 MiB Argon2id parameters
    pub fn new() -> Self {
        Self {
            params: HashParams::default(),
        }
    }

    /// Create a hasher that produces hashes with the given cost parameters.
    pub fn with_params(params: HashParams) -> Self {
        Self { params }
    }

    /// Parameters used for new hashes.
    pub fn params(&self) -> &HashParams {
        &self.params
    }

    /// Hash a plaintext password securely.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Hash, salt and the parameters used to derive them
    ///
    /// # Errors
    /// * `SaltGenerationFailed` - The OS random source is unavailable
    /// * `InvalidParams` - Configured parameters are rejected by Argon2
    /// * `HashingFailed` - Key derivation failed
    pub fn hash(&self, password: &str) -> Result<HashedPassword, PasswordError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| PasswordError::SaltGenerationFailed(e.to_string()))?;

        let hash = derive(password, &salt, self.params)?;

        Ok(HashedPassword {
            hash,
            salt,
            params: self.params,
        })
    }

    /// Verify a password against a stored hash.
    ///
    /// Re-derives the key with the stored salt and parameters, then compares
    /// in constant time.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored` - Previously computed hash
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `InvalidParams` - Stored parameters are rejected by Argon2
    /// * `VerificationFailed` - Key derivation or comparison setup failed
    pub fn verify(&self, password: &str, stored: &HashedPassword) -> Result<bool, PasswordError> {
        let candidate = derive(password, &stored.salt, stored.params)
            .map_err(|e| match e {
                PasswordError::HashingFailed(msg) => PasswordError::VerificationFailed(msg),
                other => other,
            })?;

        // `Output` equality never short-circuits on the first differing byte.
        let expected = Output::new(&stored.hash)
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;
        let actual = Output::new(&candidate)
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;

        Ok(expected == actual)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn derive(password: &str, salt: &[u8], params: HashParams) -> Result<[u8; HASH_LEN], PasswordError> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

    let mut output = [0u8; HASH_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(output)
}
