//! `/health` handler

use crate::{error::Result, models::HealthResponse, AppState};
use axum::{extract::State, Json};
use tracing::{info, warn};

/// Probes the infrastructure target and samples the host concurrently.
///
/// An unreachable target is still a 200; only a failure to read host metrics
/// turns into an error response.
pub async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    info!(
        "GET /health - Checking {} at {}",
        state.config.infrastructure.service_type,
        state.config.infrastructure.target()
    );

    let (infrastructure, system) = tokio::join!(
        state.dispatcher.check(),
        state.system_monitor.snapshot()
    );
    let system = system?;

    if !infrastructure.is_healthy() {
        warn!("Infrastructure is unhealthy: {}", infrastructure.details);
    }

    Ok(Json(HealthResponse::new(
        state.config.service.name.clone(),
        infrastructure,
        system,
    )))
}
