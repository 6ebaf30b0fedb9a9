pub mod settings;

pub use settings::{AppConfig, InfrastructureConfig, MetricsConfig, PostgresCredentials, ServerConfig, ServiceConfig};
