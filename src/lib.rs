pub mod api;
pub mod config;
pub mod insight;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::ProxyConfig;
use crate::insight::{HttpLlmClient, InsightProxy};

/// Process entry: logging, configuration, upstream client, HTTP server.
/// Runs until Ctrl-C, then shuts the server down gracefully.
pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ProxyConfig::from_env()?;
    tracing::info!(
        upstream = %config.upstream_url,
        model = %config.generation.model,
        api_key_set = config.api_key.is_some(),
        "Upstream configured"
    );

    // The blocking client owns its own runtime thread, so it is built
    // before ours starts.
    let client = HttpLlmClient::from_config(&config)?;
    let proxy = Arc::new(InsightProxy::new(
        Arc::new(client),
        config.generation.clone(),
    ));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let server = api::start_insight_server(proxy, config.bind_addr)
            .await
            .map_err(anyhow::Error::msg)?;
        tracing::info!(
            addr = %server.session.server_addr,
            session_id = %server.session.session_id,
            started_at = %server.session.started_at,
            "Listening"
        );

        tokio::signal::ctrl_c().await?;
        server.stop().await;
        Ok::<(), anyhow::Error>(())
    })
}
