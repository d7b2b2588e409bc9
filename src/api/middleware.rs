//! Middleware Components
//!
//! CORS, request tracking, and caller identity extraction.

use axum::http::{HeaderMap, HeaderName};
use axum::{extract::Request, middleware::Next, response::Response};
use tower_http::cors::ExposeHeaders;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use super::errors::ApiError;

/// Request ID header key
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the authenticated user id, set by the upstream gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the operator key for admin routes
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Create CORS middleware with configurable origins
pub fn create_cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    if allowed_origins.is_empty() || allowed_origins.contains(&"*".to_string()) {
        // Development mode: allow all origins
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(ExposeHeaders::list([HeaderName::from_static(
                REQUEST_ID_HEADER,
            )]))
    } else {
        // Production mode: specific origins
        CorsLayer::new()
            .allow_origin(
                allowed_origins
                    .into_iter()
                    .filter_map(|o| o.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers(Any)
            .expose_headers(ExposeHeaders::list([HeaderName::from_static(
                REQUEST_ID_HEADER,
            )]))
    }
}

/// Middleware to add request ID to all requests
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    // Check if request already has an ID from client
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // Store request ID in extensions for handlers to access
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    // Add request ID to response headers
    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Request ID wrapper for extracting in handlers
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Pull the authenticated user id out of the gateway header
pub fn require_user(headers: &HeaderMap, request_id: &str) -> Result<u64, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .ok_or_else(|| {
            ApiError::unauthorized(
                request_id.to_string(),
                format!("missing or invalid {} header", USER_ID_HEADER),
            )
        })
}

/// Check the operator key on admin routes
///
/// With no key configured every admin request is allowed, which keeps
/// local development friction-free.
pub fn require_admin(
    headers: &HeaderMap,
    expected_key: Option<&str>,
    request_id: &str,
) -> Result<(), ApiError> {
    let Some(expected) = expected_key else {
        return Ok(());
    };
    if let Some(provided) = headers.get(ADMIN_KEY_HEADER) {
        if provided.to_str().unwrap_or("") == expected {
            return Ok(());
        }
    }
    Err(ApiError::unauthorized(
        request_id.to_string(),
        format!("missing or invalid {} header", ADMIN_KEY_HEADER),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_user_parses_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, "42".parse().unwrap());
        assert_eq!(require_user(&headers, "req").unwrap(), 42);
    }

    #[test]
    fn test_require_user_rejects_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, "forty-two".parse().unwrap());
        assert!(require_user(&headers, "req").is_err());
        assert!(require_user(&HeaderMap::new(), "req").is_err());
    }

    #[test]
    fn test_require_admin_matches_key() {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_KEY_HEADER, "sekrit".parse().unwrap());
        assert!(require_admin(&headers, Some("sekrit"), "req").is_ok());
        assert!(require_admin(&headers, Some("other"), "req").is_err());
        assert!(require_admin(&HeaderMap::new(), Some("sekrit"), "req").is_err());
        // No key configured: open for development.
        assert!(require_admin(&HeaderMap::new(), None, "req").is_ok());
    }
}
