//! API middleware components

pub mod logging;
pub mod security;
pub mod user_auth;

pub use logging::logging_middleware;
pub use security::{security_headers_middleware, MAX_BODY_SIZE};
pub use user_auth::{bearer_header_value, extract_bearer_token, RequireUser};
