#![allow(dead_code)]
use axum::{body::Body, http::Response, Router};
use gamevault_backend::{build_router, config::Config, state::AppState};
use std::time::Duration;
use url::Url;

pub const TEST_API_KEY: &str = "test-steam-key";

pub fn test_config(upstream: &str, api_key: Option<&str>) -> Config {
    Config {
        steam_api_key: api_key.map(str::to_string),
        upstream_base_url: Url::parse(upstream).expect("upstream url"),
        bind_addr: "127.0.0.1:0".parse().expect("bind addr"),
        upstream_timeout: Duration::from_secs(5),
    }
}

pub fn test_app(upstream: &str) -> Router {
    build_router(AppState::new(test_config(upstream, Some(TEST_API_KEY))).expect("state"))
}

pub fn test_app_without_key(upstream: &str) -> Router {
    build_router(AppState::new(test_config(upstream, None)).expect("state"))
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
