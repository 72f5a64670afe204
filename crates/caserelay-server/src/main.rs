use std::sync::Arc;

use anyhow::Result;
use caserelay_server::config::ServerConfig;
use caserelay_service::{HttpNotionClient, RelayService};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    info!(
        "notion: {} (version {}, upload target {}, parallel uploads {})",
        config.notion_base_url, config.notion_version, config.upload_target, config.parallel_uploads
    );

    let client = HttpNotionClient::new(
        &config.notion_base_url,
        config.notion_api_key.clone(),
        config.notion_version.clone(),
    );
    let relay = RelayService::new(Arc::new(client), config.relay_config());

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        "caserelay-server listening on http://{}:{}",
        config.host, config.port
    );

    caserelay_server::serve(listener, relay, config.http_settings()).await
}
