//! Authentication infrastructure module
//!
//! Bearer token issuance and validation for registered users.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService, DEFAULT_EXPIRATION_HOURS};
