use anyhow::Context;
use std::sync::Arc;
use tigris_relay::{api, config, logging, relay::RelayService};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();
    let config = config::init_config().context("Failed to load config from environment")?;
    let service = RelayService::from_config(config).context("Failed to build Tigris client")?;
    let app = api::create_router(Arc::new(service), config.payload_mode);

    let listener = TcpListener::bind((std::net::Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server_port))?;
    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);
    axum::serve(listener, app).await?;
    Ok(())
}
