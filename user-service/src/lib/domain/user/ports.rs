use async_trait::async_trait;
use auth::AuthenticationResult;
use auth::HashedPassword;
use auth::SessionClaims;

use crate::domain::user::models::ChangePasswordRequest;
use crate::domain::user::models::CredentialRecord;
use crate::domain::user::models::LoginRequest;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegistrationRequest;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UpdateUserRequest;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// Validates the request, hashes the password, then stores the record.
    ///
    /// # Arguments
    /// * `request` - Raw registration input
    ///
    /// # Returns
    /// Created user, without password material
    ///
    /// # Errors
    /// * `InvalidName` / `InvalidEmail` / `InvalidPassword` / `InvalidGroup` - Validation failed, nothing stored
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Password` / `HashingTimedOut` - Hashing failed
    async fn register(&self, request: RegistrationRequest) -> Result<User, UserError>;

    /// Check credentials and issue a session token.
    ///
    /// # Arguments
    /// * `request` - Email and plaintext password
    ///
    /// # Returns
    /// Signed token with its claims
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No user with this email
    /// * `InvalidCredentials` - Password does not match
    /// * `Password` / `HashingTimedOut` - Verification failed
    /// * `Token` - Token could not be signed
    async fn login(&self, request: LoginRequest) -> Result<AuthenticationResult, UserError>;

    /// Validate a session token and return its claims.
    ///
    /// # Errors
    /// * `Token` - Signature, expiry, issuer or claims validation failed
    async fn introspect(&self, token: &str) -> Result<SessionClaims, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by exact email.
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No user with this email
    async fn get_user_by_email(&self, email: &str) -> Result<User, UserError>;

    /// List users ordered by ID, bounded by the store's maximum.
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Update existing user with the non-empty fields of the request.
    ///
    /// # Errors
    /// * Validation errors for provided fields
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    async fn update_user(&self, id: &UserId, request: UpdateUserRequest)
        -> Result<User, UserError>;

    /// Replace a user's password.
    ///
    /// # Errors
    /// * `InvalidPassword` - Policy or confirmation failure
    /// * `NotFound` - User does not exist
    async fn change_password(
        &self,
        id: &UserId,
        request: ChangePasswordRequest,
    ) -> Result<User, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for credential records.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new record, assigning it a fresh identifier.
    ///
    /// # Arguments
    /// * `user` - Validated user fields
    /// * `password` - Hash, salt and parameters
    ///
    /// # Returns
    /// Stored record
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Storage` - Store is unusable
    async fn create(&self, user: NewUser, password: HashedPassword)
        -> Result<CredentialRecord, UserError>;

    /// Retrieve record by identifier.
    ///
    /// # Returns
    /// Optional record (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<CredentialRecord>, UserError>;

    /// Retrieve record by exact, case-sensitive email.
    ///
    /// # Returns
    /// Optional record (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, UserError>;

    /// Whether a record with this identifier exists.
    async fn exists(&self, id: &UserId) -> Result<bool, UserError>;

    /// Records ordered by identifier ascending, truncated to the store maximum.
    async fn list(&self) -> Result<Vec<CredentialRecord>, UserError>;

    /// Merge the provided fields into an existing record.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    /// * `EmailAlreadyExists` - New email belongs to another record
    async fn update(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<CredentialRecord, UserError>;

    /// Replace the stored password hash.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    async fn update_password(
        &self,
        id: &UserId,
        password: HashedPassword,
    ) -> Result<CredentialRecord, UserError>;

    /// Remove record from storage.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}
