//! User resource endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::api::auth::issue_token;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse, Json, SanitizedUser, UserRecord};

/// Create the user router, mounted under `/users`
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(register_user))
        .route("/add", post(register_user))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// POST /users/add
///
/// Registers a user and returns a bearer token in the `Authorization` header.
/// The body is taken as an untyped object so mistyped fields are reported per
/// field with the rest of the validation errors.
pub async fn register_user(
    State(state): State<AppState>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Registering user");

    let user = state
        .user_service
        .create(fields)
        .await
        .map_err(|e| ApiError::from_domain(e, "There is a problem with saving the data"))?;

    let token = issue_token(&state, &user)?;

    info!(user_id = %user.id(), "User registered");

    Ok((
        StatusCode::CREATED,
        [(header::AUTHORIZATION, token)],
        Json(ApiResponse::new_user(
            "Register successfully",
            SanitizedUser::from(&user),
        )),
    ))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<ApiResponse<UserRecord>>, ApiError> {
    debug!(user_id = %id, "Updating user");

    let user = state
        .user_service
        .update(&id, fields)
        .await
        .map_err(|e| ApiError::from_domain(e, "There was a problem updating the data"))?;

    Ok(Json(ApiResponse::data(
        "User data updated",
        UserRecord::from(&user),
    )))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    debug!(user_id = %id, "Deleting user");

    state
        .user_service
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_domain(e, "There was a problem deleting this user"))?;

    info!(user_id = %id, "User deleted");

    Ok(Json(ApiResponse::message("User deleted successfully")))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserRecord>>>, ApiError> {
    debug!("Listing users");

    let users = state
        .user_service
        .list()
        .await
        .map_err(|e| ApiError::from_domain(e, "There was a problem retrieving the data"))?;

    let records = users.iter().map(UserRecord::from).collect();

    Ok(Json(ApiResponse::data(
        "Users data retrieved Successfully",
        records,
    )))
}

/// GET /users/{id}
///
/// The record is wrapped in a one-element array.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<UserRecord>>>, ApiError> {
    debug!(user_id = %id, "Getting user");

    let user = state
        .user_service
        .get(&id)
        .await
        .map_err(|e| ApiError::from_domain(e, "There was a problem retrieving the data"))?;

    Ok(Json(ApiResponse::data(
        "User data retrieved Successfully",
        vec![UserRecord::from(&user)],
    )))
}
