//! Core library for the Galaxy infrastructure sidecar: configuration, the
//! infrastructure health dispatcher, host metrics and the HTTP routes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod monitoring;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use health::{HealthCheck, HealthDispatcher, HealthResult, HealthStatus, InfraKind};
pub use monitoring::{SystemMonitor, SystemSnapshot};

use axum::Router;
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tokio::signal;
use tracing::info;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<HealthDispatcher>,
    pub system_monitor: Arc<SystemMonitor>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let dispatcher = HealthDispatcher::from_config(&config.infrastructure);
        let system_monitor = SystemMonitor::from_config(&config.metrics);

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            system_monitor: Arc::new(system_monitor),
            started_at: Instant::now(),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: HealthDispatcher) -> Self {
        self.dispatcher = Arc::new(dispatcher);
        self
    }

    pub fn with_system_monitor(mut self, system_monitor: SystemMonitor) -> Self {
        self.system_monitor = Arc::new(system_monitor);
        self
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

pub fn create_app(state: AppState) -> Router {
    let logging = middleware::logging_layer(&state.config.service.name);

    create_routes().layer(logging).with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
