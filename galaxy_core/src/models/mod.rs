pub mod responses;

pub use responses::{
    DependencyResponse, HealthChecks, HealthResponse, InfoResponse, InfrastructureService,
    InfrastructureTarget, RootResponse,
};
