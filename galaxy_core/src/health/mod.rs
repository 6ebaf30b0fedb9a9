pub mod checks;


pub use checks::{
    HealthCheck, HealthDispatcher, HealthResult, HealthStatus, InfraKind, PostgresHealthCheck,
    RedisHealthCheck, TcpHealthCheck,
};
