use reqwest::Client;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http: Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// Shares an existing client, e.g. one already pointed at a test upstream.
    pub fn with_client(config: Config, http: Client) -> Self {
        Self { config, http }
    }
}
