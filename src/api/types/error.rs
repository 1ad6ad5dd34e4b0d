//! Error envelope returned by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::DomainError;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Failure body: `{error: true, message, data?}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorResponse {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: true,
                message: message.into(),
                data: None,
            },
        }
    }

    /// Attach structured detail
    pub fn with_data(mut self, data: Value) -> Self {
        self.response.data = Some(data);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a domain error, replacing server-side detail with `public_message`
    ///
    /// The original error is logged; callers only ever see the public message.
    pub fn from_domain(err: DomainError, public_message: &str) -> Self {
        if err.is_server_side() {
            tracing::error!(error = %err, "{}", public_message);
            return Self::internal(public_message);
        }

        Self::from(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::InvalidFields(errors) => Self::bad_request("Validation error")
                .with_data(serde_json::to_value(errors).unwrap_or(Value::Null)),
            DomainError::InvalidId { message } => Self::bad_request(message),
            DomainError::Duplicate(key) => {
                let error = Self::bad_request(key.message());
                match key.field() {
                    Some(field) => error.with_data(json!({ "field": field })),
                    None => error,
                }
            }
            DomainError::Unauthorized { message } => Self::unauthorized(message),
            err @ (DomainError::Configuration { .. }
            | DomainError::Internal { .. }
            | DomainError::Storage { .. }) => {
                tracing::error!(error = %err, "Unhandled server error");
                Self::internal(INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DuplicateKey, FieldErrors};

    #[test]
    fn test_error_serialization() {
        let err = ApiError::unauthorized("Invalid password");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"], true);
        assert_eq!(json["message"], "Invalid password");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("x"), StatusCode::BAD_REQUEST),
            (
                DomainError::duplicate(DuplicateKey::Email),
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (DomainError::configuration("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_err, expected) in cases {
            let api_err = ApiError::from(domain_err);
            assert_eq!(api_err.status, expected);
        }
    }

    #[test]
    fn test_field_errors_become_data() {
        let mut errors = FieldErrors::new();
        errors.add("userName", "minLength", "too short");

        let api_err = ApiError::from(DomainError::invalid_fields(errors));

        assert_eq!(api_err.response.message, "Validation error");
        let data = api_err.response.data.unwrap();
        assert_eq!(data["userName"][0]["code"], "minLength");
    }

    #[test]
    fn test_duplicate_message_names_field() {
        let api_err = ApiError::from(DomainError::duplicate(DuplicateKey::Phone));

        assert_eq!(
            api_err.response.message,
            "Phone number is already registered, please use a different phone number."
        );
        assert_eq!(api_err.response.data.unwrap()["field"], "phone");
    }

    #[test]
    fn test_server_errors_do_not_leak() {
        let api_err = ApiError::from_domain(
            DomainError::storage("connection refused at 10.0.0.5:5432"),
            "There is a problem with saving the data",
        );

        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            api_err.response.message,
            "There is a problem with saving the data"
        );

        let api_err = ApiError::from(DomainError::storage("connection refused"));
        assert_eq!(api_err.response.message, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let api_err = ApiError::from_domain(DomainError::not_found("User not found"), "ignored");

        assert_eq!(api_err.status, StatusCode::NOT_FOUND);
        assert_eq!(api_err.response.message, "User not found");
    }
}
