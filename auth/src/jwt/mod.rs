pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::SessionClaims;
pub use claims::ValidateClaims;
pub use errors::JwtError;
pub use handler::IssuedToken;
pub use handler::JwtHandler;
