use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mali::ResolveError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Resolution errors carry a per-kind user-facing Thai reply; the original
/// error is logged and never leaks to the client.
pub enum AppError {
    /// Errors originating from the resolution engine.
    Resolve(ResolveError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        AppError::Resolve(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Resolve(err) => {
                error!("ResolveError: {err:?}");
                let status = match &err {
                    ResolveError::Encoding(_) | ResolveError::GenerationFailed(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    ResolveError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.user_reply().to_string())
            }
            AppError::Internal(err) => {
                error!("Internal server error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
