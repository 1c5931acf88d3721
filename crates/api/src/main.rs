use anyhow::Context;

use stockroom_api::config::ApiConfig;
use stockroom_infra::StoreConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    stockroom_observability::init(config.log_format);

    let services = stockroom_api::app::services::build_services(&StoreConfig::from_env())
        .context("failed to build the inventory store")?;
    let app = stockroom_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
