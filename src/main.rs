use std::sync::Arc;

use tracing::info;

use printdesk::anthropic::AnthropicClient;
use printdesk::config::ChatConfig;
use printdesk::routes::app;
use printdesk::service::chat_service::ChatService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "printdesk=debug,tower_http=debug".into()),
        )
        .init();

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let config = ChatConfig::from_env()?;
    info!(model = %config.model, "upstream configuration loaded");

    let client = AnthropicClient::new(config)?;
    let service = ChatService::new(Arc::new(client));

    // ── Listen ────────────────────────────────────────────────────────────────
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app(service)).await?;
    Ok(())
}
