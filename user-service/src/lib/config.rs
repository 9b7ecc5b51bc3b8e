use std::env;
use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::HashParams;
use auth::JwtHandler;
use auth::PasswordHasher;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use serde::Deserialize;

use crate::domain::user::service::UserService;
use crate::domain::user::service::DEFAULT_HASH_TIMEOUT;
use crate::domain::user::service::DEFAULT_MAX_CONCURRENT_HASHES;
use crate::outbound::repositories::user::DEFAULT_MAX_LIST_LENGTH;
use crate::outbound::repositories::InMemoryUserRepository;

/// Minimum HS256 secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    #[serde(default = "default_hash_timeout_ms")]
    pub hash_timeout_ms: u64,
    #[serde(default = "default_max_concurrent_hashes")]
    pub max_concurrent_hashes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_max_list_length")]
    pub max_list_length: usize,
}

fn default_issuer() -> String {
    auth::jwt::handler::DEFAULT_ISSUER.to_string()
}

fn default_expiration_minutes() -> i64 {
    auth::jwt::handler::DEFAULT_TTL_MINUTES
}

fn default_memory_kib() -> u32 {
    HashParams::default().memory_kib
}

fn default_time_cost() -> u32 {
    HashParams::default().time_cost
}

fn default_parallelism() -> u32 {
    HashParams::default().parallelism
}

fn default_hash_timeout_ms() -> u64 {
    DEFAULT_HASH_TIMEOUT.as_millis() as u64
}

fn default_max_concurrent_hashes() -> usize {
    DEFAULT_MAX_CONCURRENT_HASHES
}

fn default_max_list_length() -> usize {
    DEFAULT_MAX_LIST_LENGTH
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
            hash_timeout_ms: default_hash_timeout_ms(),
            max_concurrent_hashes: default_max_concurrent_hashes(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_list_length: default_max_list_length(),
        }
    }
}

// The secret must never end up in logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, PASSWORD__MEMORY_KIB, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// Meant to be called once at startup; the result is validated.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse and validate configuration from a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Config = ConfigBuilder::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings that would weaken sessions or password storage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.jwt.issuer.trim().is_empty() {
            return Err(ConfigError::Message("jwt.issuer must not be empty".to_string()));
        }
        if self.jwt.expiration_minutes <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_minutes must be positive".to_string(),
            ));
        }

        let params = self.password.hash_params()?;
        if !params.meets_production_floor() {
            return Err(ConfigError::Message(format!(
                "password.memory_kib must be at least {}",
                HashParams::MIN_MEMORY_KIB
            )));
        }
        if self.password.hash_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "password.hash_timeout_ms must be positive".to_string(),
            ));
        }
        if self.password.max_concurrent_hashes == 0 {
            return Err(ConfigError::Message(
                "password.max_concurrent_hashes must be positive".to_string(),
            ));
        }

        if self.store.max_list_length == 0 {
            return Err(ConfigError::Message(
                "store.max_list_length must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the authenticator described by the `jwt` and `password` sections.
    pub fn authenticator(&self) -> Result<Authenticator, ConfigError> {
        let hasher = PasswordHasher::with_params(self.password.hash_params()?);
        let jwt_handler = JwtHandler::new(self.jwt.secret.as_bytes())
            .with_issuer(self.jwt.issuer.clone())
            .with_ttl(chrono::Duration::minutes(self.jwt.expiration_minutes));

        Ok(Authenticator::from_parts(hasher, jwt_handler))
    }

    /// Build an empty store honoring the configured list bound.
    pub fn store(&self) -> InMemoryUserRepository {
        InMemoryUserRepository::with_max_list_length(self.store.max_list_length)
    }

    /// Wire a user service over a fresh store, with the configured
    /// authenticator, hash timeout and hash concurrency.
    pub fn user_service(&self) -> Result<UserService<InMemoryUserRepository>, ConfigError> {
        Ok(
            UserService::new(Arc::new(self.store()), Arc::new(self.authenticator()?))
                .with_hash_timeout(self.password.hash_timeout())
                .with_max_concurrent_hashes(self.password.max_concurrent_hashes),
        )
    }
}

impl PasswordConfig {
    pub fn hash_params(&self) -> Result<HashParams, ConfigError> {
        HashParams::new(self.memory_kib, self.time_cost, self.parallelism)
            .map_err(|e| ConfigError::Message(format!("password: {}", e)))
    }

    pub fn hash_timeout(&self) -> Duration {
        Duration::from_millis(self.hash_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_toml(&format!("[jwt]\nsecret = \"{}\"\n", SECRET)).unwrap();

        assert_eq!(config.jwt.issuer, "todo-api");
        assert_eq!(config.jwt.expiration_minutes, 60);
        assert_eq!(config.password.hash_params().unwrap(), HashParams::default());
        assert_eq!(config.password.hash_timeout(), Duration::from_secs(10));
        assert_eq!(config.password.max_concurrent_hashes, 4);
        assert_eq!(config.store.max_list_length, 100);
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_toml(&format!(
            r#"
            [jwt]
            secret = "{}"
            issuer = "tasks"
            expiration_minutes = 15

            [password]
            memory_kib = 131072
            time_cost = 2
            parallelism = 2
            hash_timeout_ms = 2500
            max_concurrent_hashes = 2

            [store]
            max_list_length = 25
            "#,
            SECRET
        ))
        .unwrap();

        assert_eq!(config.jwt.issuer, "tasks");
        assert_eq!(config.password.memory_kib, 131072);
        assert_eq!(config.password.hash_timeout(), Duration::from_millis(2500));
        assert_eq!(config.store().max_list_length(), 25);

        let service = config.user_service().unwrap();
        assert_eq!(service.hash_timeout(), Duration::from_millis(2500));
        assert_eq!(service.available_hash_permits(), 2);

        let authenticator = config.authenticator().unwrap();
        assert_eq!(authenticator.password_params().time_cost, 2);
        let issued = authenticator
            .generate_token("user123", "Alice", vec![])
            .unwrap();
        assert_eq!(issued.claims.iss, "tasks");
        assert_eq!(issued.claims.exp - issued.claims.iat, 15 * 60);
    }

    #[test]
    fn test_missing_secret_rejected() {
        assert!(Config::from_toml("[store]\nmax_list_length = 5\n").is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = Config::from_toml("[jwt]\nsecret = \"too-short\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_memory_floor_enforced() {
        let result = Config::from_toml(&format!(
            "[jwt]\nsecret = \"{}\"\n[password]\nmemory_kib = 1024\n",
            SECRET
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_list_length_rejected() {
        let result = Config::from_toml(&format!(
            "[jwt]\nsecret = \"{}\"\n[store]\nmax_list_length = 0\n",
            SECRET
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::from_toml(&format!("[jwt]\nsecret = \"{}\"\n", SECRET)).unwrap();
        assert!(!format!("{:?}", config).contains(SECRET));
    }
}
