use anyhow::anyhow;
use std::{env, net::SocketAddr, time::Duration};
use url::Url;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.steampowered.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server-held secret injected into every relayed request.
    pub steam_api_key: Option<String>,
    pub upstream_base_url: Url,
    pub bind_addr: SocketAddr,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // VITE_STEAM_API_KEY is the name older deployments exported.
        let steam_api_key = env::var("STEAM_API_KEY")
            .or_else(|_| env::var("VITE_STEAM_API_KEY"))
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let upstream_raw = env::var("STEAM_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_BASE_URL.to_string());
        let upstream_base_url = Url::parse(&upstream_raw)
            .map_err(|_| anyhow!("Invalid STEAM_API_BASE_URL value: {}", upstream_raw))?;

        let bind_raw = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .map_err(|_| anyhow!("Invalid BIND_ADDR value: {}", bind_raw))?;

        let upstream_timeout_seconds = env::var("UPSTREAM_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_TIMEOUT_SECONDS.to_string())
            .parse()
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECONDS);

        Ok(Config {
            steam_api_key,
            upstream_base_url,
            bind_addr,
            upstream_timeout: Duration::from_secs(upstream_timeout_seconds),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.steam_api_key.is_some()
    }
}

pub fn mask_secret(s: Option<&str>) -> String {
    match s {
        None | Some("") => "<empty>".into(),
        Some(s) => {
            let prefix = s.chars().take(4).collect::<String>();
            format!("{}*** (len={})", prefix, s.len())
        }
    }
}
