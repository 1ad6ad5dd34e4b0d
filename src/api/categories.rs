//! Category resource endpoints
//!
//! `{key}` is either a category id or a category name.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse, Json};
use crate::domain::category::{Category, NewCategoryInput};

/// Create the category router, mounted under `/categories`
pub fn create_categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/add", post(create_category))
        .route(
            "/{key}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

/// POST /categories/add
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<NewCategoryInput>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), ApiError> {
    debug!("Creating category");

    let category = state
        .category_service
        .create(input)
        .await
        .map_err(|e| ApiError::from_domain(e, "There is a problem with saving the data"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data("Category created successfully", category)),
    ))
}

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = state
        .category_service
        .list()
        .await
        .map_err(|e| ApiError::from_domain(e, "There was a problem retrieving the data"))?;

    Ok(Json(ApiResponse::data(
        "Categories retrieved successfully",
        categories,
    )))
}

/// GET /categories/{key}
pub async fn get_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    debug!(key = %key, "Getting category");

    let category = state
        .category_service
        .get(&key)
        .await
        .map_err(|e| ApiError::from_domain(e, "There was a problem retrieving the data"))?;

    Ok(Json(ApiResponse::data(
        "Category retrieved successfully",
        category,
    )))
}

/// PUT /categories/{key}
pub async fn update_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    debug!(key = %key, "Updating category");

    let category = state
        .category_service
        .update(&key, fields)
        .await
        .map_err(|e| ApiError::from_domain(e, "There was a problem updating the data"))?;

    Ok(Json(ApiResponse::data("Category updated", category)))
}

/// DELETE /categories/{key}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    debug!(key = %key, "Deleting category");

    state
        .category_service
        .delete(&key)
        .await
        .map_err(|e| ApiError::from_domain(e, "There was a problem deleting this category"))?;

    Ok(Json(ApiResponse::message("Category deleted successfully")))
}
