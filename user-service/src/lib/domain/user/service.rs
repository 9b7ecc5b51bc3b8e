use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::AuthenticationResult;
use auth::Authenticator;
use auth::SessionClaims;
use tokio::sync::Semaphore;

use crate::domain::user::models::ChangePasswordRequest;
use crate::domain::user::models::CredentialRecord;
use crate::domain::user::models::LoginRequest;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegistrationRequest;
use crate::domain::user::models::UpdateUserRequest;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Upper bound on a single hash or verification unless configured otherwise.
pub const DEFAULT_HASH_TIMEOUT: Duration = Duration::from_secs(10);

/// Hashes allowed to run at once unless configured otherwise.
pub const DEFAULT_MAX_CONCURRENT_HASHES: usize = 4;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Password hashing runs on the blocking pool, never under the store lock.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    hash_timeout: Duration,
    hash_permits: Arc<Semaphore>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password hashing and token handling
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
            hash_timeout: DEFAULT_HASH_TIMEOUT,
            hash_permits: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_HASHES)),
        }
    }

    /// Bound every hash and verification by `timeout`.
    pub fn with_hash_timeout(mut self, timeout: Duration) -> Self {
        self.hash_timeout = timeout;
        self
    }

    /// Cap the number of hashes running on the blocking pool at once.
    pub fn with_max_concurrent_hashes(mut self, max: usize) -> Self {
        self.hash_permits = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    pub fn hash_timeout(&self) -> Duration {
        self.hash_timeout
    }

    /// Hash permits not currently held by running or queued work.
    pub fn available_hash_permits(&self) -> usize {
        self.hash_permits.available_permits()
    }

    /// Run CPU-heavy password work off the async workers, bounded by the
    /// hash timeout.
    ///
    /// The timeout bounds how long the caller waits, including the wait for
    /// a hash permit. A blocking task cannot be cancelled: work that has
    /// already started runs to completion after a timeout and keeps its
    /// permit until then, so abandoned hashes still count against
    /// `with_max_concurrent_hashes`.
    async fn run_blocking<F, T, E>(&self, work: F) -> Result<T, UserError>
    where
        F: FnOnce(&Authenticator) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<UserError> + Send + 'static,
    {
        let authenticator = Arc::clone(&self.authenticator);
        let permits = Arc::clone(&self.hash_permits);
        let task = async move {
            let permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return Err(UserError::Unknown(format!("hash permits closed: {}", e))),
            };

            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                work(&authenticator)
            })
            .await
            .map_err(|join_error| {
                tracing::error!(error = %join_error, "Password task failed");
                UserError::Unknown(format!("password task failed: {}", join_error))
            })
        };

        match tokio::time::timeout(self.hash_timeout, task).await {
            Ok(Ok(result)) => result.map_err(|e| {
                let err: UserError = e.into();
                if let UserError::Password(inner) = &err {
                    tracing::error!(error = %inner, "Password hashing failed");
                }
                err
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => {
                tracing::error!(
                    timeout_ms = self.hash_timeout.as_millis() as u64,
                    "Password hashing timed out"
                );
                Err(UserError::HashingTimedOut)
            }
        }
    }

    async fn find_record(&self, id: &UserId) -> Result<CredentialRecord, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

impl From<AuthenticationError> for UserError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
            AuthenticationError::PasswordError(e) => UserError::Password(e),
            AuthenticationError::JwtError(e) => UserError::Token(e),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, request: RegistrationRequest) -> Result<User, UserError> {
        let command = request.try_into_command()?;

        let password = command.password;
        let hashed = self
            .run_blocking(move |authenticator| authenticator.hash_password(password.expose()))
            .await?;

        let new_user = NewUser {
            name: command.name,
            email: command.email,
            groups: command.groups,
        };
        let record = self.repository.create(new_user, hashed).await?;

        tracing::info!(user_id = %record.id, "User created");

        Ok(record.to_user())
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthenticationResult, UserError> {
        let record = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| UserError::NotFoundByEmail(request.email.clone()))?;

        let user_id = record.id;
        let result = self
            .run_blocking(move |authenticator| {
                let groups = record.group_names();
                authenticator.authenticate(
                    &request.password,
                    &record.password,
                    record.id,
                    record.name.as_str(),
                    groups,
                )
            })
            .await;

        match result {
            Ok(result) => {
                tracing::debug!(user_id = %user_id, "Login succeeded, session token issued");
                Ok(result)
            }
            Err(UserError::InvalidCredentials) => {
                tracing::warn!(user_id = %user_id, "Login rejected: invalid credentials");
                Err(UserError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    async fn introspect(&self, token: &str) -> Result<SessionClaims, UserError> {
        self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Session token rejected");
            UserError::Token(e)
        })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        Ok(self.find_record(id).await?.to_user())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .map(|record| record.to_user())
            .ok_or(UserError::NotFoundByEmail(email.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self
            .repository
            .list()
            .await?
            .iter()
            .map(CredentialRecord::to_user)
            .collect())
    }

    async fn update_user(
        &self,
        id: &UserId,
        request: UpdateUserRequest,
    ) -> Result<User, UserError> {
        let command = request.try_into_command()?;
        let record = self.repository.update(id, command).await?;

        tracing::info!(user_id = %record.id, "User updated");

        Ok(record.to_user())
    }

    async fn change_password(
        &self,
        id: &UserId,
        request: ChangePasswordRequest,
    ) -> Result<User, UserError> {
        let password = request.try_into_password()?;

        // Fail fast before spending a hash on an unknown user.
        if !self.repository.exists(id).await? {
            return Err(UserError::NotFound(id.to_string()));
        }

        let hashed = self
            .run_blocking(move |authenticator| authenticator.hash_password(password.expose()))
            .await?;
        let record = self.repository.update_password(id, hashed).await?;

        tracing::info!(user_id = %record.id, "Password changed");

        Ok(record.to_user())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}
