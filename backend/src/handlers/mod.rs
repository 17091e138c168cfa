pub mod health;
pub mod relay;

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::error::ErrorResponse;

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Route not found".into(),
            code: "NOT_FOUND".into(),
            details: None,
        }),
    )
}
