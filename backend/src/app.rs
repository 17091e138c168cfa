use axum::{
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware, state::AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route(
            "/api/steam",
            get(handlers::relay::relay_flat).post(handlers::relay::relay_flat),
        )
        .route(
            "/api/steam/{*route}",
            get(handlers::relay::relay_path).post(handlers::relay::relay_path),
        )
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(axum_middleware::from_fn(middleware::cors_headers))
                .layer(axum_middleware::from_fn(middleware::log_error_responses)),
        )
        .with_state(state)
}
