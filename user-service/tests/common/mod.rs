#![allow(dead_code)]

use std::sync::Arc;

use auth::Authenticator;
use auth::HashParams;
use auth::JwtHandler;
use auth::PasswordHasher;
use user_service::domain::user::models::LoginRequest;
use user_service::domain::user::models::RegistrationRequest;
use user_service::domain::user::service::UserService;
use user_service::outbound::repositories::InMemoryUserRepository;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application wired with the real store and authenticator.
///
/// Hashing parameters are far below the production floor so the suite
/// stays fast.
pub struct TestApp {
    pub service: UserService<InMemoryUserRepository>,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_jwt_handler(JwtHandler::new(TEST_SECRET))
    }

    pub fn with_max_list_length(max_list_length: usize) -> Self {
        Self::build(
            InMemoryUserRepository::with_max_list_length(max_list_length),
            JwtHandler::new(TEST_SECRET),
        )
    }

    pub fn with_jwt_handler(jwt_handler: JwtHandler) -> Self {
        Self::build(InMemoryUserRepository::new(), jwt_handler)
    }

    fn build(repository: InMemoryUserRepository, jwt_handler: JwtHandler) -> Self {
        let params = HashParams::new(1024, 1, 1).expect("Invalid test hash params");
        let authenticator = Arc::new(Authenticator::from_parts(
            PasswordHasher::with_params(params),
            jwt_handler,
        ));
        let repository = Arc::new(repository);
        let service = UserService::new(repository.clone(), authenticator.clone());

        Self {
            service,
            repository,
            authenticator,
        }
    }
}

pub fn registration(name: &str, email: &str, password: &str) -> RegistrationRequest {
    RegistrationRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        password_confirmation: password.to_string(),
        groups: vec![],
    }
}

pub fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}
