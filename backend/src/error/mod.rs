use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(anyhow::Error),
    #[error("internal server error: {0}")]
    InternalServerError(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::Configuration(msg) => {
                tracing::error!(reason = %msg, "Relay misconfigured");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, "CONFIGURATION_ERROR")
            }
            AppError::UpstreamUnavailable(err) => {
                tracing::error!("Upstream request failed: {:?}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    "Steam API is unreachable".to_string(),
                    "UPSTREAM_UNAVAILABLE",
                )
            }
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: code.to_string(),
            details: None,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

/// The request URL carries the server-held key, so it is stripped before the
/// error can reach a log line.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::UpstreamUnavailable(err.without_url().into())
    }
}
