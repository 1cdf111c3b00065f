//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use medibusca_core::CoreError;

use crate::upstream::UpstreamError;

pub const UPSTREAM_NOT_CONFIGURED: &str = "API endpoint not configured. Please contact support.";

/// Normalized error payload returned by every `/api` route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    ServiceUnavailable(String),
    /// The model answered, but not with something we can show
    BadGateway(String),
    GatewayTimeout(String),
    /// Non-success answer from the backend API, relayed with its status
    Upstream { status: StatusCode, body: String },
    Internal(String),
}

impl AppError {
    pub fn upstream_not_configured() -> Self {
        AppError::ServiceUnavailable(UPSTREAM_NOT_CONFIGURED.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client
    pub fn message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::BadGateway(msg)
            | AppError::GatewayTimeout(msg) => msg.clone(),
            AppError::Upstream { body, .. } => format!("Backend error: {}", body),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Internal error");
        }
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, body } => AppError::Upstream { status, body },
            UpstreamError::Timeout => {
                AppError::GatewayTimeout("Backend request timed out".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AppError::BadRequest(msg),
            CoreError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_relayed() {
        let err = AppError::from(UpstreamError::Status {
            status: StatusCode::NOT_FOUND,
            body: "no such clinic".to_string(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Backend error: no such clinic");
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AppError::from(UpstreamError::Decode("expected value".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");
    }
}
