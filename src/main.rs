use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use mashar::router::init_router;
use mashar::state::init_app_state;
use mashar_observability::{init_metrics, init_tracing, metrics_app, shutdown_tracer};
use tracing::{error, info};

fn port_from_env(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let state = init_app_state().await?;
    let app = init_router(state);

    if let Some(handle) = init_metrics() {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], port_from_env("METRICS_PORT", 3001)));
        let listener = tokio::net::TcpListener::bind(metrics_addr)
            .await
            .context("Failed to bind metrics listener")?;
        info!(%metrics_addr, "Metrics available at /metrics");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let port = port_from_env("PORT", 3000);
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
        .await
        .context("Failed to bind server listener")?;
    info!(port, "🚀 Server running on http://localhost:{port}");
    info!("📚 Swagger UI available at http://localhost:{port}/swagger-ui");
    info!("📖 Scalar UI available at http://localhost:{port}/scalar");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    shutdown_tracer().await;
    Ok(())
}
