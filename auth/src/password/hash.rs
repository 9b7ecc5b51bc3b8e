use argon2::Params;

use super::errors::PasswordError;

/// Length of the random salt drawn for every hash, in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the derived key, in bytes.
pub const HASH_LEN: usize = 32;

/// Argon2id cost parameters.
///
/// Stored next to every hash so verification always replays the exact
/// parameters a hash was produced with, even after the defaults change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub time_cost: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl HashParams {
    /// Production memory floor: 64 MiB.
    pub const MIN_MEMORY_KIB: u32 = 64 * 1024;

    /// Create and validate a parameter set.
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `time_cost` - Number of iterations
    /// * `parallelism` - Number of lanes
    ///
    /// # Errors
    /// * `InvalidParams` - Argon2 rejects the combination
    pub fn new(memory_kib: u32, time_cost: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Self {
            memory_kib,
            time_cost,
            parallelism,
        };
        params.to_argon2()?;
        Ok(params)
    }

    /// Whether the memory cost reaches the production floor.
    pub fn meets_production_floor(&self) -> bool {
        self.memory_kib >= Self::MIN_MEMORY_KIB
    }

    pub(crate) fn to_argon2(self) -> Result<Params, PasswordError> {
        Params::new(
            self.memory_kib,
            self.time_cost,
            self.parallelism,
            Some(HASH_LEN),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))
    }
}

impl Default for HashParams {
    /// 64 MiB, one pass, four lanes.
    fn default() -> Self {
        Self {
            memory_kib: Self::MIN_MEMORY_KIB,
            time_cost: 1,
            parallelism: 4,
        }
    }
}

/// Derived password hash together with its salt and cost parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub hash: [u8; HASH_LEN],
    pub salt: [u8; SALT_LEN],
    pub params: HashParams,
}

impl HashedPassword {
    /// Whether this hash was produced with parameters other than `current`.
    ///
    /// Callers can re-hash on the next successful login when this is true.
    pub fn needs_rehash(&self, current: &HashParams) -> bool {
        self.params != *current
    }
}

// Keeps hash and salt bytes out of logs and panic messages.
impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"<redacted>")
            .field("salt", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_meet_floor() {
        let params = HashParams::default();
        assert!(params.meets_production_floor());
        assert!(params.to_argon2().is_ok());
    }

    #[test]
    fn test_new_rejects_invalid_params() {
        // Argon2 requires at least one pass and one lane
        assert!(matches!(
            HashParams::new(1024, 0, 1),
            Err(PasswordError::InvalidParams(_))
        ));
        assert!(matches!(
            HashParams::new(1024, 1, 0),
            Err(PasswordError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_low_cost_params_below_floor() {
        let params = HashParams::new(1024, 1, 1).expect("valid params");
        assert!(!params.meets_production_floor());
    }

    #[test]
    fn test_needs_rehash() {
        let stored = HashedPassword {
            hash: [1; HASH_LEN],
            salt: [2; SALT_LEN],
            params: HashParams::new(1024, 1, 1).unwrap(),
        };

        assert!(stored.needs_rehash(&HashParams::default()));
        assert!(!stored.needs_rehash(&stored.params));
    }

    #[test]
    fn test_debug_redacts_bytes() {
        let stored = HashedPassword {
            hash: [7; HASH_LEN],
            salt: [9; SALT_LEN],
            params: HashParams::default(),
        };

        let rendered = format!("{:?}", stored);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("[7, 7"));
    }
}
