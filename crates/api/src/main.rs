use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockpilot_observability::init();

    let config = stockpilot_core::AppConfig::from_env();
    let services = Arc::new(stockpilot_api::app::services::build_services(config).await?);
    let app = stockpilot_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
