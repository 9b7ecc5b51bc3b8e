pub mod argon2;
pub mod errors;
pub mod hash;

pub use self::argon2::PasswordHasher;
pub use errors::PasswordError;
pub use hash::HashParams;
pub use hash::HashedPassword;
