//! Same-origin relay in front of the Steam Web API.
//!
//! Browsers cannot call the upstream directly (it grants no cross-origin
//! access), and the API key must stay on the server. Two request shapes are
//! accepted because both are still deployed:
//!
//! * path-suffix (current): `/api/steam/ISteamUser/GetPlayerSummaries/v0002/?steamids=1`
//! * flat query (legacy):   `/api/steam?endpoint=ISteamUser/GetPlayerSummaries/v0002/&steamids=1`

use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{header::CONTENT_TYPE, HeaderValue},
    response::Response,
};
use url::Url;

use crate::{error::AppError, state::AppState};

const ENDPOINT_PARAM: &str = "endpoint";
const KEY_PARAM: &str = "key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRequest {
    pub route: String,
    pub params: Vec<(String, String)>,
}

impl RelayRequest {
    pub fn from_path(route: &str, raw_query: Option<&str>) -> Result<Self, AppError> {
        let params = forwardable_params(parse_query(raw_query), false);
        Ok(Self {
            route: validate_route(route)?,
            params,
        })
    }

    pub fn from_flat_query(raw_query: Option<&str>) -> Result<Self, AppError> {
        let pairs = parse_query(raw_query);
        let route = pairs
            .iter()
            .find(|(name, _)| name == ENDPOINT_PARAM)
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        Ok(Self {
            route: validate_route(&route)?,
            params: forwardable_params(pairs, true),
        })
    }
}

pub async fn relay_path(
    State(state): State<AppState>,
    Path(route): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let request = RelayRequest::from_path(&route, query.as_deref())?;
    forward(&state, request).await
}

pub async fn relay_flat(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let request = RelayRequest::from_flat_query(query.as_deref())?;
    forward(&state, request).await
}

async fn forward(state: &AppState, request: RelayRequest) -> Result<Response, AppError> {
    let api_key = state
        .config
        .steam_api_key
        .as_deref()
        .ok_or_else(|| AppError::Configuration("Steam API key not configured".into()))?;

    let url = upstream_url(
        &state.config.upstream_base_url,
        &request.route,
        api_key,
        &request.params,
    );
    tracing::debug!(
        route = %request.route,
        url = %redact_key(&url),
        "Forwarding Steam API request"
    );

    let upstream = state.http.get(url).send().await?;
    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let body = upstream.bytes().await?;

    if status.is_success() {
        tracing::debug!(route = %request.route, status = status.as_u16(), "Steam API responded");
    } else {
        tracing::warn!(
            route = %request.route,
            status = status.as_u16(),
            reason = status.canonical_reason().unwrap_or(""),
            "Steam API returned an error status"
        );
    }

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .map_err(|err| AppError::InternalServerError(err.into()))
}

pub fn parse_query(raw_query: Option<&str>) -> Vec<(String, String)> {
    raw_query
        .map(|raw| {
            url::form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// Drops caller-supplied keys, empty values and repeated names (first wins).
fn forwardable_params(pairs: Vec<(String, String)>, flat: bool) -> Vec<(String, String)> {
    let mut kept: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (name, value) in pairs {
        if name == KEY_PARAM || (flat && name == ENDPOINT_PARAM) || value.is_empty() {
            continue;
        }
        if kept.iter().any(|(existing, _)| *existing == name) {
            continue;
        }
        kept.push((name, value));
    }
    kept
}

pub fn validate_route(raw: &str) -> Result<String, AppError> {
    let route = raw.trim().trim_start_matches('/');
    if route.is_empty() {
        return Err(AppError::BadRequest(
            "No Steam API endpoint specified".into(),
        ));
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-');
    if !route.chars().all(allowed) {
        return Err(AppError::BadRequest(format!(
            "Invalid Steam API endpoint: {}",
            route
        )));
    }
    if route
        .split('/')
        .any(|segment| segment == ".." || segment == ".")
    {
        return Err(AppError::BadRequest(format!(
            "Invalid Steam API endpoint: {}",
            route
        )));
    }

    Ok(route.to_string())
}

pub fn upstream_url(base: &Url, route: &str, api_key: &str, params: &[(String, String)]) -> Url {
    let mut url = base.clone();
    let path = format!("{}/{}", base.path().trim_end_matches('/'), route);
    url.set_path(&path);
    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair(KEY_PARAM, api_key);
        for (name, value) in params {
            query.append_pair(name, value);
        }
    }
    url
}

fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            if name == KEY_PARAM {
                (name.into_owned(), "[REDACTED]".to_string())
            } else {
                (name.into_owned(), value.into_owned())
            }
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
