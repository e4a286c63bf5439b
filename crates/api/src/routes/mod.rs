//! Route handlers for the API.

pub mod connections;
pub mod health;
pub mod messages;
pub mod profile;
pub mod users;

use axum::extract::FromRequest;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::cors::{create_cors_layer, reject_disallowed_origin};
use crate::error::ApiError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Treat empty strings like absent fields.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Liveness
        .route("/api", get(health::root))
        .route("/api/root", get(health::root_alias))
        .route("/api/health", get(health::health))
        // Users and profiles
        .route("/api/user", post(users::create_user))
        .route("/api/users", get(users::list_users))
        .route(
            "/api/profile/:uid",
            get(profile::get_own_profile).post(profile::upsert_profile),
        )
        .route("/api/profile/:uid/public", get(profile::get_public_profile))
        // Connections
        .route("/api/connections/:uid", get(connections::list_connections))
        .route("/api/connections/request", post(connections::send_request))
        .route("/api/connections/accept", post(connections::accept_request))
        .route("/api/connections/reject", post(connections::reject_request))
        .route(
            "/api/connections/requests/:uid",
            get(connections::list_incoming_requests),
        )
        // Messages
        .route("/api/messages/send", post(messages::send_message))
        .route("/api/messages/:uid1/:uid2", get(messages::list_conversation))
}

/// The full application: routes, CORS policy, and request tracing.
pub fn app(state: AppState) -> Router {
    router()
        .layer(create_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            reject_disallowed_origin,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use database::Database;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::static_tokens::StaticTokenVerifier;
    use crate::state::AppState;

    pub const ALLOWED_ORIGIN: &str = "https://studlyf.in";

    /// App over a fresh in-memory database; users u1..u3 hold `token-<uid>`.
    pub async fn test_app() -> (Router, Database) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let verifier = ["u1", "u2", "u3"]
            .iter()
            .fold(StaticTokenVerifier::new(), |v, uid| {
                v.with_token(format!("token-{}", uid), *uid)
            });
        let state = AppState::new(
            db.clone(),
            Arc::new(verifier),
            vec![ALLOWED_ORIGIN.to_string()],
        );

        (super::app(state), db)
    }

    pub async fn call(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    /// Send a request as `uid` (or anonymously) and decode the body.
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        uid: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(uid) = uid {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer token-{}", uid));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = call(app, request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(app: &Router, uri: &str, uid: Option<&str>) -> (StatusCode, Value) {
        send(app, Method::GET, uri, uid, None).await
    }

    pub async fn post(app: &Router, uri: &str, uid: Option<&str>, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, uid, Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;

    use super::testing::*;

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let (app, _db) = test_app().await;
        let protected = [
            (Method::GET, "/api/profile/u1"),
            (Method::GET, "/api/profile/u1/public"),
            (Method::GET, "/api/connections/u1"),
            (Method::GET, "/api/connections/requests/u1"),
            (Method::GET, "/api/messages/u1/u2"),
        ];
        for (method, uri) in protected {
            let (status, body) = send(&app, method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
            assert!(body["error"].is_string());
        }

        let posts = [
            "/api/user",
            "/api/profile/u1",
            "/api/connections/request",
            "/api/connections/accept",
            "/api/connections/reject",
            "/api/messages/send",
        ];
        for uri in posts {
            let (status, _) = post(&app, uri, None, json!({ "from": "u1", "to": "u2" })).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let (app, _db) = test_app().await;
        let (status, _) = get(&app, "/api/connections/nobody", Some("nobody")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_routes_need_no_token() {
        let (app, _db) = test_app().await;
        for uri in ["/api", "/api/root", "/api/health", "/api/users"] {
            let (status, _) = get(&app, uri, None).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (app, _db) = test_app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/connections/request")
            .header(header::AUTHORIZATION, "Bearer token-u1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_disallowed_origin_refused() {
        let (app, _db) = test_app().await;
        let request = Request::builder()
            .uri("/api/users")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let (app, _db) = test_app().await;
        let request = Request::builder()
            .uri("/api/users")
            .header(header::ORIGIN, ALLOWED_ORIGIN)
            .body(Body::empty())
            .unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            ALLOWED_ORIGIN
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
    }

    #[tokio::test]
    async fn test_preflight_from_allowed_origin() {
        let (app, _db) = test_app().await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/connections/request")
            .header(header::ORIGIN, ALLOWED_ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
            .body(Body::empty())
            .unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }
}
