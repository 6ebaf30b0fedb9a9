//! Entry point for the Galaxy infrastructure sidecar

use anyhow::Result;
use galaxy_core::{create_app, run_server, AppConfig, AppState};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // A broken environment must stop us before the listener is bound.
    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {}", config.bind_address(), e))?;

    info!(
        "Starting Galaxy sidecar for {} ({})",
        config.service.name, config.infrastructure.service_type
    );
    info!("Infrastructure service: {}", config.infrastructure.target());
    info!(
        "Probe timeout: {}s, CPU sample window: {}ms",
        config.infrastructure.probe_timeout_seconds, config.metrics.cpu_sample_interval_ms
    );

    let state = AppState::new(config);
    info!("Health probe selected: {:?}", state.dispatcher.kind());

    let app = create_app(state);

    run_server(app, addr).await?;

    info!("Sidecar shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}=info,galaxy_core=info,tower_http=info",
            env!("CARGO_CRATE_NAME").replace('-', "_")
        )
        .into()
    });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
