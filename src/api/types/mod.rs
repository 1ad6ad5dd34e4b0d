//! Request and response types shared by the HTTP handlers

pub mod error;
pub mod json;
pub mod response;
pub mod user;

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use response::ApiResponse;
pub use user::{SanitizedUser, UserRecord};
