use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::auth;
use super::categories;
use super::health;
use super::middleware::{logging_middleware, security_headers_middleware, MAX_BODY_SIZE};
use super::state::AppState;
use super::users;
use crate::config::ServerConfig;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Login and current user
        .merge(auth::create_auth_router())
        // Resources
        .nest("/users", users::create_users_router())
        .nest("/categories", categories::create_categories_router())
        // Add state and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(&server.cors_origins))
}

/// CORS policy exposing the `Authorization` response header
///
/// An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::AUTHORIZATION]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::category::MockCategoryRepository;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};
    use crate::infrastructure::category::{CategoryService, InMemoryCategoryRepository};
    use crate::infrastructure::user::{BcryptHasher, InMemoryUserRepository, UserService};

    const TEST_SECRET: &str = "router-test-secret";

    fn hasher() -> Arc<BcryptHasher> {
        Arc::new(BcryptHasher::new(4).unwrap())
    }

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(JwtConfig::new(TEST_SECRET, 24)))
    }

    fn test_app() -> Router {
        let state = AppState::new(
            Arc::new(UserService::new(
                Arc::new(InMemoryUserRepository::new()),
                hasher(),
            )),
            Arc::new(CategoryService::new(Arc::new(
                InMemoryCategoryRepository::new(),
            ))),
            jwt(),
        );

        create_router_with_state(state, &ServerConfig::default())
    }

    async fn failing_app(fail_users: bool, fail_categories: bool) -> Router {
        let users = Arc::new(MockUserRepository::new());
        users.set_should_fail(fail_users).await;
        let categories = Arc::new(MockCategoryRepository::new());
        categories.set_should_fail(fail_categories).await;

        let state = AppState::new(
            Arc::new(UserService::new(users, hasher())),
            Arc::new(CategoryService::new(categories)),
            jwt(),
        );

        create_router_with_state(state, &ServerConfig::default())
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, headers, json)
    }

    fn ada() -> Value {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "userName": "ada_l",
            "email": "ada@example.com",
            "phone": "+44 555-0100",
            "password": "analytical-engine"
        })
    }

    async fn register(app: &Router, payload: Value) -> (String, String) {
        let (status, headers, body) = send(app, "POST", "/users/add", Some(payload), None).await;
        assert_eq!(status, StatusCode::CREATED);

        let token = headers[header::AUTHORIZATION].to_str().unwrap().to_string();
        let id = body["newUser"]["_id"].as_str().unwrap().to_string();
        (token, id)
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app();

        let (status, _, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

        let (status, _, _) = send(&app, "GET", "/live", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, body) = send(&app, "GET", "/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ready_reports_store_failures() {
        let app = failing_app(true, false).await;
        let (status, _, body) = send(&app, "GET", "/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");

        let app = failing_app(true, true).await;
        let (status, _, body) = send(&app, "GET", "/ready", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_register_returns_token_for_new_user() {
        let app = test_app();
        let (status, headers, body) = send(&app, "POST", "/users/add", Some(ada()), None).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Register successfully");
        assert_eq!(body["newUser"]["userName"], "ada_l");
        assert!(body["newUser"].get("password").is_none());

        let header_value = headers[header::AUTHORIZATION].to_str().unwrap();
        let token = header_value.strip_prefix("Bearer ").unwrap();
        let claims = jwt().validate(token).unwrap();
        assert_eq!(claims.sub, body["newUser"]["_id"].as_str().unwrap());
    }

    #[tokio::test]
    async fn test_register_alias_route() {
        let app = test_app();
        let (status, _, _) = send(&app, "POST", "/users", Some(ada()), None).await;

        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_register_duplicates_name_the_field() {
        let app = test_app();
        register(&app, ada()).await;

        let mut same_name = ada();
        same_name["email"] = json!("other@example.com");
        same_name["phone"] = json!("555-0199");
        let (status, _, body) = send(&app, "POST", "/users/add", Some(same_name), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Username already taken, please choose a different username."
        );
        assert_eq!(body["data"]["field"], "userName");

        let mut same_email = ada();
        same_email["userName"] = json!("countess");
        same_email["phone"] = json!("555-0199");
        let (status, _, body) = send(&app, "POST", "/users/add", Some(same_email), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["field"], "email");

        let mut same_phone = ada();
        same_phone["userName"] = json!("countess");
        same_phone["email"] = json!("other@example.com");
        let (status, _, body) = send(&app, "POST", "/users/add", Some(same_phone), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["field"], "phone");
    }

    #[tokio::test]
    async fn test_register_short_user_name() {
        let app = test_app();
        let (status, _, body) = send(
            &app,
            "POST",
            "/users/add",
            Some(json!({ "userName": "abc" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "Validation error");
        assert!(!body["data"]["userName"].as_array().unwrap().is_empty());
        // Every missing field is reported alongside
        assert!(body["data"]["email"].is_array());
        assert!(body["data"]["password"].is_array());
    }

    #[tokio::test]
    async fn test_register_mistyped_field_lists_every_error() {
        let app = test_app();
        let (status, _, body) = send(
            &app,
            "POST",
            "/users/add",
            Some(json!({ "userName": 123, "email": "bad" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation error");
        assert_eq!(body["data"]["userName"][0]["code"], "type");
        assert_eq!(
            body["data"]["email"][0]["message"],
            "Please fill a valid email address"
        );
        for field in ["firstName", "lastName", "phone", "password"] {
            assert!(body["data"][field].is_array(), "missing error for {field}");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let app = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/users/add")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"userName\":"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_register_storage_failure_is_sanitized() {
        let app = failing_app(true, false).await;
        let (status, _, body) = send(&app, "POST", "/users/add", Some(ada()), None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "There is a problem with saving the data");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_login() {
        let app = test_app();
        let (_, id) = register(&app, ada()).await;

        let (status, headers, body) = send(
            &app,
            "POST",
            "/login",
            Some(json!({ "email": "ada@example.com", "password": "analytical-engine" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["_id"], id.as_str());
        assert!(headers.contains_key(header::AUTHORIZATION));

        let (status, _, body) = send(
            &app,
            "POST",
            "/login",
            Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid password");

        let (status, _, body) = send(
            &app,
            "POST",
            "/login",
            Some(json!({ "email": "nobody@example.com", "password": "whatever1" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn test_me_with_registration_token() {
        let app = test_app();
        let (token, id) = register(&app, ada()).await;

        let (status, _, body) = send(&app, "GET", "/me", None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Authenticated user");
        assert_eq!(body["user"]["_id"], id.as_str());
    }

    #[tokio::test]
    async fn test_me_rejects_missing_and_foreign_tokens() {
        let app = test_app();
        let (_, id) = register(&app, ada()).await;

        let (status, _, _) = send(&app, "GET", "/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let foreign = JwtService::new(JwtConfig::new("another-secret", 24));
        let user_id = crate::domain::UserId::parse(&id).unwrap();
        let token = format!("Bearer {}", foreign.generate(&user_id).unwrap());

        let (status, _, body) = send(&app, "GET", "/me", None, Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_list_and_get_users() {
        let app = test_app();
        let (_, id) = register(&app, ada()).await;

        let (status, _, body) = send(&app, "GET", "/users", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Users data retrieved Successfully");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _, body) = send(&app, "GET", &format!("/users/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        let records = body["data"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["firstName"], "Ada");
        assert_ne!(records[0]["password"], "analytical-engine");
    }

    #[tokio::test]
    async fn test_get_missing_and_malformed_ids() {
        let app = test_app();

        let missing = uuid::Uuid::new_v4();
        let (status, _, body) =
            send(&app, "GET", &format!("/users/{}", missing), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");

        let (status, _, body) = send(&app, "GET", "/users/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid user id");
    }

    #[tokio::test]
    async fn test_update_user() {
        let app = test_app();
        let (_, id) = register(&app, ada()).await;
        let uri = format!("/users/{}", id);

        let (status, _, body) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({ "firstName": "Augusta" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User data updated");
        assert_eq!(body["data"]["firstName"], "Augusta");

        let (_, _, body) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(body["data"][0]["firstName"], "Augusta");
    }

    #[tokio::test]
    async fn test_update_rejects_forbidden_fields() {
        let app = test_app();
        let (_, id) = register(&app, ada()).await;
        let uri = format!("/users/{}", id);

        let (_, _, before) = send(&app, "GET", &uri, None, None).await;

        let (status, _, body) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({ "password": "new-password", "firstName": "Augusta" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["password"][0]["code"], "forbidden_field");

        let (_, _, after) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(before["data"], after["data"]);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let app = test_app();
        let uri = format!("/users/{}", uuid::Uuid::new_v4());

        let (status, _, _) =
            send(&app, "PUT", &uri, Some(json!({ "firstName": "Augusta" })), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let app = test_app();
        let (_, id) = register(&app, ada()).await;
        let uri = format!("/users/{}", id);

        let (status, _, body) = send(&app, "DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User deleted successfully");

        let (status, _, _) = send(&app, "DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_categories_by_id_and_name() {
        let app = test_app();

        let (status, _, body) = send(
            &app,
            "POST",
            "/categories/add",
            Some(json!({ "name": "Books", "description": "Printed matter" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["_id"].as_str().unwrap().to_string();

        let (status, _, body) =
            send(&app, "GET", &format!("/categories/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Books");

        let (status, _, body) = send(&app, "GET", "/categories/Books", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["_id"], id.as_str());

        let (status, _, body) = send(
            &app,
            "POST",
            "/categories/add",
            Some(json!({ "name": "Books" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["field"], "name");

        let (status, _, body) = send(
            &app,
            "PUT",
            "/categories/Books",
            Some(json!({ "name": "Novels" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Novels");

        let (status, _, body) = send(&app, "GET", "/categories", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _, _) = send(&app, "DELETE", "/categories/Novels", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(&app, "GET", "/categories/Novels", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_exposes_authorization() {
        let app = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/users/add")
            .header(header::ORIGIN, "https://app.example.com")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(ada().to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let exposed = response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS]
            .to_str()
            .unwrap()
            .to_lowercase();

        assert!(exposed.contains("authorization"));
        assert!(response.headers().contains_key("x-request-id"));
    }
}
