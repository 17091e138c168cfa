use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamevault_backend::{
    build_router,
    config::{mask_secret, Config},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamevault_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        steam_api_key = %mask_secret(config.steam_api_key.as_deref()),
        upstream = %config.upstream_base_url,
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        "Loaded configuration from environment/.env"
    );
    if !config.has_api_key() {
        tracing::warn!("STEAM_API_KEY is not set; relay requests will fail with CONFIGURATION_ERROR");
    }

    let addr = config.bind_addr;
    let app = build_router(AppState::new(config)?);

    tracing::info!("Relay listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
