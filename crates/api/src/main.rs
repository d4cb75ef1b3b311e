use anyhow::{Context, Result};
use vidhi_api::{build_app, ApiConfig};
use vidhi_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("vidhi_api");

    let config = ApiConfig::from_env();
    let app = build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(
        bind = %config.bind,
        kb_root = ?config.kb_root,
        origins = config.allowed_origins.len(),
        "vidhi saarthi api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
