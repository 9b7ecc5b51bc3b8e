use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::JwtError;

/// Post-decode validation hook for claim payloads.
///
/// Runs after the signature and expiry have been checked, so a claims type
/// can enforce its own shape without touching the decode path.
pub trait ValidateClaims {
    /// Check that the decoded claims are well-formed.
    ///
    /// # Errors
    /// * `MissingClaim` - A required field is empty
    /// * `InvalidToken` - A field is present but malformed
    fn validate(&self) -> Result<(), JwtError>;
}

/// Maximum length of a single group name carried in a token.
pub const MAX_GROUP_LEN: usize = 26;

/// Claims carried by a session token.
///
/// Uses the registered JWT names for the standard fields so any JWT tooling
/// can read them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Display name of the user
    pub name: String,

    /// Authorization groups granted to the user
    #[serde(default)]
    pub groups: Vec<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl SessionClaims {
    /// Create claims for a user, valid from `now` for `ttl`.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `name` - Display name
    /// * `groups` - Authorization groups
    /// * `issuer` - Issuer identifier
    /// * `now` - Issuance time
    /// * `ttl` - Lifetime of the token
    pub fn for_user(
        user_id: impl ToString,
        name: impl Into<String>,
        groups: Vec<String>,
        issuer: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            name: name.into(),
            groups,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: issuer.into(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Expiration as a timestamp, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if token is expired.
    ///
    /// A token is only valid strictly before its expiration second.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}

impl ValidateClaims for SessionClaims {
    fn validate(&self) -> Result<(), JwtError> {
        if self.sub.trim().is_empty() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(JwtError::MissingClaim("name".to_string()));
        }
        if self.jti.is_empty() {
            return Err(JwtError::MissingClaim("jti".to_string()));
        }
        if self.iat > self.exp {
            return Err(JwtError::InvalidToken(
                "issued after its expiration".to_string(),
            ));
        }
        for group in &self.groups {
            if !is_well_formed_group(group) {
                return Err(JwtError::InvalidToken(format!(
                    "malformed group: {:?}",
                    group
                )));
            }
        }
        Ok(())
    }
}

/// Group names are 1-26 characters of ASCII alphanumerics, `.`, `_`, `:` or `-`.
pub fn is_well_formed_group(group: &str) -> bool {
    !group.is_empty()
        && group.len() <= MAX_GROUP_LEN
        && group
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '-'))
}
