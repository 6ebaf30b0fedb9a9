//! Static Galaxy metadata endpoints

use crate::{
    handlers::routes::ENDPOINTS,
    models::{DependencyResponse, InfoResponse, InfrastructureService, InfrastructureTarget, RootResponse},
    AppConfig, AppState,
};
use axum::{extract::State, Json};
use tracing::info;

pub async fn handle_info(State(state): State<AppState>) -> Json<InfoResponse> {
    info!("GET /galaxy/info");

    let service = &state.config.service;
    Json(InfoResponse {
        name: service.name.clone(),
        description: service.description.clone(),
        tier: service.tier.clone(),
        team: service.team.clone(),
        version: state.version.clone(),
        infrastructure_type: state.config.infrastructure.service_type.clone(),
        galaxy_managed: true,
        uptime_seconds: state.uptime_seconds(),
    })
}

pub async fn handle_root(State(state): State<AppState>) -> Json<RootResponse> {
    info!("GET /galaxy/root");

    let config: &AppConfig = &state.config;
    Json(RootResponse {
        service: config.service.name.clone(),
        message: format!(
            "Galaxy Infrastructure Sidecar for {}",
            config.infrastructure.service_type
        ),
        tier: config.service.tier.clone(),
        team: config.service.team.clone(),
        infrastructure: InfrastructureTarget::from(config),
        endpoints: ENDPOINTS.iter().map(|path| path.to_string()).collect(),
    })
}

pub async fn handle_dependencies(State(state): State<AppState>) -> Json<DependencyResponse> {
    info!("GET /galaxy/dependencies");

    Json(DependencyResponse {
        service: state.config.service.name.clone(),
        dependencies: Vec::new(),
        infrastructure_service: InfrastructureService {
            target: InfrastructureTarget::from(&*state.config),
            galaxy_sidecar: true,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dependencies_handler_marks_sidecar() {
        let state = AppState::new(AppConfig::default());

        let Json(body) = handle_dependencies(State(state)).await;

        assert!(body.dependencies.is_empty());
        assert!(body.infrastructure_service.galaxy_sidecar);
        assert_eq!(body.infrastructure_service.target.port, 5432);
    }

    #[tokio::test]
    async fn test_root_handler_lists_every_endpoint() {
        let state = AppState::new(AppConfig::default());

        let Json(body) = handle_root(State(state)).await;

        assert_eq!(body.message, "Galaxy Infrastructure Sidecar for postgres");
        assert_eq!(body.endpoints, ENDPOINTS.to_vec());
    }
}
