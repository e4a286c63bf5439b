//! Cross-origin policy.
//!
//! Only allow-listed origins get credentialed CORS responses. A request that
//! carries any other `Origin` is refused before it reaches a handler; requests
//! without an `Origin` (mobile apps, curl) pass through.

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::state::AppState;

const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Create the CORS layer for an origin allow-list.
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, X_REQUESTED_WITH])
}

/// Refuse requests from origins outside the allow-list.
pub async fn reject_disallowed_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|o| state.is_origin_allowed(o))
            .unwrap_or(false);
        if !allowed {
            warn!(?origin, "Blocked origin");
            return (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": "Not allowed by CORS" })),
            )
                .into_response();
        }
    }

    next.run(request).await
}
