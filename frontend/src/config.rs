use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::api::RelayShape;

pub const DEFAULT_RELAY_BASE_URL: &str = "http://localhost:3000/api/steam";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:8080";
pub const RELAY_PATH: &str = "/api/steam";

/// One lookup source (`env.js` globals, `window.__GAMEVAULT_CONFIG`, `config.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub relay_base_url: Option<String>,
    #[serde(default)]
    pub app_origin: Option<String>,
    #[serde(default)]
    pub relay_shape: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub relay_base_url: String,
    pub app_origin: String,
    pub relay_shape: RelayShape,
}

static CONFIG: OnceLock<ResolvedConfig> = OnceLock::new();

/// Accepts `v1`/`flat_query` and `v2`/`path_suffix`.
pub fn parse_relay_shape(label: &str) -> Option<RelayShape> {
    match label.trim().to_ascii_lowercase().as_str() {
        "v1" | "flat" | "flat_query" => Some(RelayShape::FlatQuery),
        "v2" | "path" | "path_suffix" => Some(RelayShape::PathSuffix),
        _ => None,
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Merges sources in priority order; the first source that sets a field wins.
pub fn resolve(sources: &[RuntimeConfig], window_origin: Option<&str>) -> ResolvedConfig {
    let window_origin = window_origin
        .map(|o| o.trim_end_matches('/'))
        .filter(|o| !o.is_empty() && *o != "null");

    let relay_base_url = sources
        .iter()
        .find_map(|s| non_empty(&s.relay_base_url))
        .or_else(|| window_origin.map(|o| format!("{}{}", o, RELAY_PATH)))
        .unwrap_or_else(|| DEFAULT_RELAY_BASE_URL.to_string());

    let app_origin = sources
        .iter()
        .find_map(|s| non_empty(&s.app_origin))
        .or_else(|| window_origin.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_APP_ORIGIN.to_string());

    let relay_shape = sources
        .iter()
        .filter_map(|s| s.relay_shape.as_deref())
        .find_map(parse_relay_shape)
        .unwrap_or_default();

    ResolvedConfig {
        relay_base_url,
        app_origin: app_origin.trim_end_matches('/').to_string(),
        relay_shape,
    }
}

#[cfg(target_arch = "wasm32")]
mod sources {
    use super::RuntimeConfig;
    use wasm_bindgen::JsValue;

    fn read_key(obj: &JsValue, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| {
            js_sys::Reflect::get(obj, &(*key).into())
                .ok()
                .filter(|v| !v.is_undefined() && !v.is_null())
                .and_then(|v| v.as_string())
        })
    }

    fn from_global(name: &str) -> Option<RuntimeConfig> {
        let win = web_sys::window()?;
        let any = js_sys::Reflect::get(&win, &name.into()).ok()?;
        if any.is_undefined() || any.is_null() {
            return None;
        }
        Some(RuntimeConfig {
            relay_base_url: read_key(&any, &["RELAY_BASE_URL", "relay_base_url"]),
            app_origin: read_key(&any, &["APP_ORIGIN", "app_origin"]),
            relay_shape: read_key(&any, &["RELAY_SHAPE", "relay_shape"]),
        })
    }

    async fn fetch_runtime_config(origin: &str) -> Option<RuntimeConfig> {
        let resp = reqwest::get(format!("{}/config.json", origin)).await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        resp.json::<RuntimeConfig>().await.ok()
    }

    pub fn window_origin() -> Option<String> {
        crate::utils::browser::current_origin()
    }

    // window.__GAMEVAULT_ENV (env.js) takes precedence over __GAMEVAULT_CONFIG,
    // then ./config.json.
    pub async fn collect() -> Vec<RuntimeConfig> {
        let mut found: Vec<RuntimeConfig> = ["__GAMEVAULT_ENV", "__GAMEVAULT_CONFIG"]
            .iter()
            .filter_map(|name| from_global(name))
            .collect();
        if let Some(origin) = window_origin() {
            if let Some(cfg) = fetch_runtime_config(&origin).await {
                found.push(cfg);
            }
        }
        found
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod sources {
    use super::RuntimeConfig;

    pub fn window_origin() -> Option<String> {
        None
    }

    pub async fn collect() -> Vec<RuntimeConfig> {
        vec![RuntimeConfig {
            relay_base_url: std::env::var("GAMEVAULT_RELAY_BASE_URL").ok(),
            app_origin: std::env::var("GAMEVAULT_APP_ORIGIN").ok(),
            relay_shape: std::env::var("GAMEVAULT_RELAY_SHAPE").ok(),
        }]
    }
}

pub async fn await_config() -> ResolvedConfig {
    if let Some(cached) = CONFIG.get() {
        return cached.clone();
    }
    let found = sources::collect().await;
    let resolved = resolve(&found, sources::window_origin().as_deref());
    let _ = CONFIG.set(resolved.clone());
    resolved
}

pub async fn await_relay_base_url() -> String {
    await_config().await.relay_base_url
}

pub async fn await_app_origin() -> String {
    await_config().await.app_origin
}

pub async fn init() {
    let resolved = await_config().await;
    log::info!(
        "runtime config: relay={} shape={:?} origin={}",
        resolved.relay_base_url,
        resolved.relay_shape,
        resolved.app_origin
    );
}
