//! API key authentication for the `/api` routes

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ErrorBody;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// API Key authentication state
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// With no key configured every request is allowed
    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.api_key else {
            return true;
        };
        headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|provided| provided == expected)
    }
}

/// Reject requests without a valid `X-API-Key` header
pub async fn auth_middleware(request: Request<Body>, next: Next) -> Response {
    let authorized = request
        .extensions()
        .get::<ApiKeyAuth>()
        .is_none_or(|auth| auth.is_authorized(request.headers()));

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
        let body = ErrorBody {
            error: "Invalid or missing API key".to_string(),
        };
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_key_configured_allows_all() {
        let auth = ApiKeyAuth::new(None);
        assert!(auth.is_authorized(&HeaderMap::new()));
    }

    #[test]
    fn test_key_must_match() {
        let auth = ApiKeyAuth::new(Some("secret".to_string()));
        let mut headers = HeaderMap::new();
        assert!(!auth.is_authorized(&headers));

        headers.insert(API_KEY_HEADER, "wrong".parse().unwrap());
        assert!(!auth.is_authorized(&headers));

        headers.insert(API_KEY_HEADER, "secret".parse().unwrap());
        assert!(auth.is_authorized(&headers));
    }
}
