//! JSON payloads served by the Galaxy endpoints

use crate::config::AppConfig;
use crate::health::{HealthResult, HealthStatus};
use crate::monitoring::SystemSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub service: String,
    pub infrastructure_status: HealthStatus,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub infrastructure: HealthResult,
    pub system: SystemSnapshot,
}

impl HealthResponse {
    /// Overall status follows the infrastructure probe alone; system load
    /// never makes the service unhealthy.
    pub fn new(service: String, infrastructure: HealthResult, system: SystemSnapshot) -> Self {
        Self {
            status: infrastructure.status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            service,
            infrastructure_status: infrastructure.status,
            checks: HealthChecks {
                infrastructure,
                system,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub description: String,
    pub tier: String,
    pub team: String,
    pub version: String,
    pub infrastructure_type: String,
    pub galaxy_managed: bool,
    pub uptime_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureTarget {
    #[serde(rename = "type")]
    pub service_type: String,
    pub host: String,
    pub port: u16,
}

impl From<&AppConfig> for InfrastructureTarget {
    fn from(config: &AppConfig) -> Self {
        Self {
            service_type: config.infrastructure.service_type.clone(),
            host: config.infrastructure.host.clone(),
            port: config.infrastructure.port,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub service: String,
    pub message: String,
    pub tier: String,
    pub team: String,
    pub infrastructure: InfrastructureTarget,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureService {
    #[serde(flatten)]
    pub target: InfrastructureTarget,
    pub galaxy_sidecar: bool,
}

/// Infrastructure services are leaves: `dependencies` is always empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyResponse {
    pub service: String,
    pub dependencies: Vec<String>,
    pub infrastructure_service: InfrastructureService,
}
