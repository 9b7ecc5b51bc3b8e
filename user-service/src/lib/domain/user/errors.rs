use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for UserName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Name is required")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Password confirmation does not match")]
    ConfirmationMismatch,
}

/// Error for Group validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("Invalid group {0:?}: expected 1-26 characters of letters, digits, '.', '_', ':' or '-'")]
    InvalidFormat(String),
}

/// Coarse error category, for callers that map errors onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    InvalidCredentials,
    Token,
    Internal,
}

impl ErrorKind {
    /// HTTP status code conventionally used for this kind of error.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::InvalidCredentials | ErrorKind::Token => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Duplicate => 409,
            ErrorKind::Internal => 500,
        }
    }
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid groups: {0}")]
    InvalidGroup(#[from] GroupError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User not found with email: {0}")]
    NotFoundByEmail(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid session token: {0}")]
    Token(#[from] JwtError),

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Password hashing timed out")]
    HashingTimedOut,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl UserError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UserError::InvalidUserId(_)
            | UserError::InvalidName(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidGroup(_) => ErrorKind::Validation,
            UserError::NotFound(_) | UserError::NotFoundByEmail(_) => ErrorKind::NotFound,
            UserError::EmailAlreadyExists(_) => ErrorKind::Duplicate,
            UserError::InvalidCredentials => ErrorKind::InvalidCredentials,
            UserError::Token(_) => ErrorKind::Token,
            UserError::Password(_)
            | UserError::HashingTimedOut
            | UserError::Storage(_)
            | UserError::Unknown(_) => ErrorKind::Internal,
        }
    }

    /// Name of the request field a validation error refers to.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            UserError::InvalidUserId(_) => Some("id"),
            UserError::InvalidName(_) => Some("name"),
            UserError::InvalidEmail(_) => Some("email"),
            UserError::InvalidPassword(PasswordPolicyError::ConfirmationMismatch) => {
                Some("password_confirmation")
            }
            UserError::InvalidPassword(_) => Some("password"),
            UserError::InvalidGroup(_) => Some("groups"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_identify_field() {
        let err = UserError::from(EmailError::Empty);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field(), Some("email"));

        let err = UserError::from(PasswordPolicyError::ConfirmationMismatch);
        assert_eq!(err.field(), Some("password_confirmation"));

        let err = UserError::from(PasswordPolicyError::TooShort { min: 8, actual: 3 });
        assert_eq!(err.field(), Some("password"));
    }

    #[test]
    fn test_kind_status_codes() {
        assert_eq!(UserError::InvalidCredentials.kind().status_code(), 401);
        assert_eq!(
            UserError::from(JwtError::TokenExpired).kind().status_code(),
            401
        );
        assert_eq!(UserError::NotFound("x".into()).kind().status_code(), 404);
        assert_eq!(
            UserError::EmailAlreadyExists("a@b.c".into())
                .kind()
                .status_code(),
            409
        );
        assert_eq!(UserError::HashingTimedOut.kind().status_code(), 500);
        assert_eq!(UserError::from(NameError::Empty).kind().status_code(), 400);
    }

    #[test]
    fn test_credentials_message_does_not_leak_detail() {
        assert_eq!(UserError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(UserError::InvalidCredentials.field(), None);
    }
}
