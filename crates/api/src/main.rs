use std::sync::Arc;

use anyhow::Context;

use inventree_api::app::{build_app, services::AppServices};
use inventree_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    inventree_observability::init(&config.logging);

    if config.uses_dev_secret() {
        tracing::warn!("auth.jwt_secret not set; using insecure dev default");
    }

    let media = config.media_dir(true).context("failed to create media directory")?;
    let static_dir = config.static_dir(true).context("failed to create static directory")?;
    tracing::debug!(media = %media.display(), static_dir = %static_dir.display(), "data directories ready");

    let services = Arc::new(AppServices::from_config(&config)?);
    let app = build_app(config.auth.jwt_secret.clone(), services);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
