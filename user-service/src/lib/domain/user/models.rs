use std::fmt;
use std::str::FromStr;

use auth::HashedPassword;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::GroupError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserError;
use crate::user::errors::UserIdError;

/// Stored credential record.
///
/// Owned exclusively by the user repository; services only see it for the
/// duration of a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: UserId,
    pub name: UserName,
    pub email: EmailAddress,
    pub groups: Vec<Group>,
    pub password: HashedPassword,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Public view of the record, without password material.
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            groups: self.groups.clone(),
            created_at: self.created_at,
        }
    }

    /// Group names as plain strings, for token claims.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.as_str().to_string()).collect()
    }
}

/// Public user entity returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub email: EmailAddress,
    pub groups: Vec<Group>,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
///
/// UUID v7, so identifiers sort by creation time at millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new time-ordered user ID.
    ///
    /// # Returns
    /// UserId with a UUID v7
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Trimmed, 1-64 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    const MAX_LENGTH: usize = 64;

    /// Create a new valid name.
    ///
    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name longer than 64 characters
    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Case is preserved
/// and lookups are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `Empty` - Email is blank
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        if email.trim().is_empty() {
            return Err(EmailError::Empty);
        }
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    ///
    /// # Returns
    /// Email string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Authorization group (scope) such as `project.read`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Group(String);

impl Group {
    /// # Errors
    /// * `InvalidFormat` - Empty, longer than 26 characters, or contains
    ///   characters outside `[A-Za-z0-9._:-]`
    pub fn new(group: String) -> Result<Self, GroupError> {
        if auth::jwt::claims::is_well_formed_group(&group) {
            Ok(Self(group))
        } else {
            Err(GroupError::InvalidFormat(group))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate a list of groups, dropping duplicates and keeping them sorted.
    pub fn parse_all(groups: Vec<String>) -> Result<Vec<Self>, GroupError> {
        let mut parsed = groups
            .into_iter()
            .map(Group::new)
            .collect::<Result<Vec<_>, _>>()?;
        parsed.sort();
        parsed.dedup();
        Ok(parsed)
    }
}

/// Plaintext password that passed the length policy and its confirmation.
///
/// No `Display`; `Debug` is redacted.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 128;

    /// Check a password and its confirmation.
    ///
    /// # Errors
    /// * `TooShort` / `TooLong` - Length outside 8-128 characters
    /// * `ConfirmationMismatch` - The two entries differ
    pub fn confirmed(password: String, confirmation: &str) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if password != confirmation {
            return Err(PasswordPolicyError::ConfirmationMismatch);
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Raw registration input, as decoded from a request body.
#[derive(Clone, Default, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl RegistrationRequest {
    /// Validate every field and build a command.
    ///
    /// # Errors
    /// The first failing field, as a field-identifying `UserError`.
    pub fn try_into_command(self) -> Result<CreateUserCommand, UserError> {
        let name = UserName::new(self.name)?;
        let email = EmailAddress::new(self.email)?;
        let password = Password::confirmed(self.password, &self.password_confirmation)?;
        let groups = Group::parse_all(self.groups)?;
        Ok(CreateUserCommand::new(name, email, groups, password))
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

/// Raw login input.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Raw partial update input. Empty strings count as "not provided".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

impl UpdateUserRequest {
    /// Validate the provided fields and build a command.
    ///
    /// # Errors
    /// The first failing field, as a field-identifying `UserError`.
    pub fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        let name = non_empty(self.name).map(UserName::new).transpose()?;
        let email = non_empty(self.email).map(EmailAddress::new).transpose()?;
        let groups = self
            .groups
            .filter(|groups| !groups.is_empty())
            .map(Group::parse_all)
            .transpose()?;
        Ok(UpdateUserCommand {
            name,
            email,
            groups,
        })
    }
}

/// Raw password change input.
#[derive(Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
    pub password_confirmation: String,
}

impl ChangePasswordRequest {
    /// # Errors
    /// * `InvalidPassword` - Policy or confirmation failure
    pub fn try_into_password(self) -> Result<Password, UserError> {
        Ok(Password::confirmed(
            self.password,
            &self.password_confirmation,
        )?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub name: UserName,
    pub email: EmailAddress,
    pub groups: Vec<Group>,
    pub password: Password,
}

impl CreateUserCommand {
    /// Construct a new create user command.
    ///
    /// # Arguments
    /// * `name` - Validated name
    /// * `email` - Validated email address
    /// * `groups` - Validated groups
    /// * `password` - Confirmed plaintext password (will be hashed by service)
    pub fn new(name: UserName, email: EmailAddress, groups: Vec<Group>, password: Password) -> Self {
        Self {
            name,
            email,
            groups,
            password,
        }
    }
}

/// User fields handed to the repository on creation; the repository assigns
/// the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: UserName,
    pub email: EmailAddress,
    pub groups: Vec<Group>,
}

/// Command to update an existing user with optional validated fields.
///
/// All fields are optional to support partial updates.
/// Only provided fields will be updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserCommand {
    pub name: Option<UserName>,
    pub email: Option<EmailAddress>,
    pub groups: Option<Vec<Group>>,
}
