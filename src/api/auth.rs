//! Authentication endpoints
//!
//! Tokens are stateless HS256 JWTs carried in `Authorization: Bearer <token>`.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::{debug, info};

use crate::api::middleware::{bearer_header_value, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse, Json, SanitizedUser};
use crate::domain::user::{LoginInput, User};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(get_current_user))
}

/// Sign a token for `user` and format it as an Authorization header value
pub(crate) fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let token = state
        .jwt_service
        .generate(user.id())
        .map_err(|e| ApiError::from_domain(e, "Failed to issue token"))?;

    Ok(bearer_header_value(&token))
}

/// Login with email and password
///
/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Login attempt");

    let user = state
        .user_service
        .authenticate(input)
        .await
        .map_err(|e| ApiError::from_domain(e, "Login failed"))?;

    let token = issue_token(&state, &user)?;

    info!(user_id = %user.id(), "User logged in");

    Ok((
        [(header::AUTHORIZATION, token)],
        Json(ApiResponse::user(
            "Login successful",
            SanitizedUser::from(&user),
        )),
    ))
}

/// Get the user named by the bearer token
///
/// GET /me
pub async fn get_current_user(
    RequireUser(user): RequireUser,
) -> Json<ApiResponse<SanitizedUser>> {
    Json(ApiResponse::user(
        "Authenticated user",
        SanitizedUser::from(&user),
    ))
}
