use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::{api::error::ApiError, config};

/// How the relay expects the upstream route to be encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayShape {
    /// v2: `<relay>/<route>?<params>`.
    #[default]
    PathSuffix,
    /// v1: `<relay>?endpoint=<route>&<params>`, still served for older deployments.
    FlatQuery,
}

/// What a call site does when the relay or upstream fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Identity-affecting calls: surface a configuration error, never substitute data.
    Strict,
    /// Per-title enrichment: log and degrade to an empty value.
    Soft,
}

impl FallbackPolicy {
    pub fn apply<T: Default>(
        self,
        operation: &str,
        result: Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        match (self, result) {
            (_, Ok(value)) => Ok(value),
            (FallbackPolicy::Strict, Err(err)) => {
                log::error!("Steam API call failed while {}: {}", operation, err);
                Err(ApiError::configuration(operation, &err))
            }
            (FallbackPolicy::Soft, Err(err)) => {
                log::warn!(
                    "Steam API call failed while {}, continuing without it: {}",
                    operation,
                    err
                );
                Ok(T::default())
            }
        }
    }
}

/// Gateway to the Steam Web API through the same-origin relay.
#[derive(Clone, Default)]
pub struct SteamClient {
    client: Client,
    base_url: Option<String>,
    shape: Option<RelayShape>,
}

impl SteamClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: Some(base_url.into()),
            shape: None,
        }
    }

    pub fn with_relay_shape(mut self, shape: RelayShape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Explicit shape, else the default. Runtime config may still override it
    /// for clients without an explicit base URL.
    pub fn relay_shape(&self) -> RelayShape {
        self.shape.unwrap_or_default()
    }

    async fn resolved_relay(&self) -> (String, RelayShape) {
        match &self.base_url {
            Some(base) => (base.clone(), self.relay_shape()),
            None => {
                let resolved = config::await_config().await;
                (
                    resolved.relay_base_url,
                    self.shape.unwrap_or(resolved.relay_shape),
                )
            }
        }
    }

    pub fn relay_url(
        base_url: &str,
        shape: RelayShape,
        route: &str,
        params: &[(&str, String)],
    ) -> Result<Url, ApiError> {
        let route = route.trim_start_matches('/');
        let raw = match shape {
            RelayShape::PathSuffix => format!("{}/{}", base_url.trim_end_matches('/'), route),
            RelayShape::FlatQuery => base_url.to_string(),
        };
        let mut url = Url::parse(&raw).map_err(|e| ApiError::Configuration {
            operation: "resolving relay url".into(),
            reason: format!("{}: {}", raw, e),
        })?;

        if shape == RelayShape::FlatQuery || !params.is_empty() {
            let mut query = url.query_pairs_mut();
            if shape == RelayShape::FlatQuery {
                query.append_pair("endpoint", route);
            }
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Issues `route` through the relay and returns the raw JSON body.
    pub async fn call(&self, route: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        self.call_as(route, params).await
    }

    pub async fn call_as<T: DeserializeOwned>(
        &self,
        route: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let (base_url, shape) = self.resolved_relay().await;
        let url = Self::relay_url(&base_url, shape, route, params)?;
        log::debug!("Fetching Steam API via relay: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Steam API error response ({}): {}", status, body);
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_suffix_url_appends_route_and_params() {
        let url = SteamClient::relay_url(
            "http://localhost:3000/api/steam/",
            RelayShape::PathSuffix,
            "ISteamUser/GetPlayerSummaries/v0002/",
            &[("steamids", "1,2".to_string())],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/steam/ISteamUser/GetPlayerSummaries/v0002/?steamids=1%2C2"
        );
    }

    #[test]
    fn path_suffix_url_without_params_has_no_query() {
        let url = SteamClient::relay_url(
            "http://localhost:3000/api/steam",
            RelayShape::PathSuffix,
            "/ISteamUserStats/GetSchemaForGame/v2/",
            &[],
        )
        .unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(url.path(), "/api/steam/ISteamUserStats/GetSchemaForGame/v2/");
    }

    #[test]
    fn flat_query_url_carries_endpoint_param() {
        let url = SteamClient::relay_url(
            "http://localhost:3000/api/steam",
            RelayShape::FlatQuery,
            "IPlayerService/GetOwnedGames/v0001/",
            &[("steamid", "7".to_string())],
        )
        .unwrap();
        assert_eq!(url.path(), "/api/steam");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("endpoint".to_string(), "IPlayerService/GetOwnedGames/v0001/".to_string()),
                ("steamid".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn relative_base_is_a_configuration_error() {
        let err = SteamClient::relay_url("/api/steam", RelayShape::PathSuffix, "a/b", &[])
            .unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn soft_policy_degrades_to_default() {
        let failed: Result<Vec<u32>, ApiError> = Err(ApiError::Transport("boom".into()));
        assert_eq!(
            FallbackPolicy::Soft.apply("fetching things", failed),
            Ok(Vec::new())
        );
    }

    #[test]
    fn strict_policy_turns_failures_into_configuration_errors() {
        let failed: Result<Vec<u32>, ApiError> = Err(ApiError::Transport("boom".into()));
        let err = FallbackPolicy::Strict
            .apply("fetching things", failed)
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration { ref operation, .. } if operation == "fetching things"));
    }
}
