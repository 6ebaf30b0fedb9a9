//! Connectivity probes for the infrastructure service this sidecar fronts

use crate::config::{InfrastructureConfig, PostgresCredentials};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Outcome of a single probe. Failures are carried in `details`, never as an
/// error value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResult {
    pub status: HealthStatus,
    pub details: String,
}

impl HealthResult {
    pub fn healthy(details: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            details: details.into(),
        }
    }

    pub fn unhealthy(details: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            details: details.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Which probe a configured `INFRA_SERVICE_TYPE` selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfraKind {
    Postgres,
    Redis,
    GenericTcp,
}

impl InfraKind {
    /// Exact, case-sensitive match; anything unrecognised is probed over TCP.
    pub fn from_service_type(service_type: &str) -> Self {
        match service_type {
            "postgres" => InfraKind::Postgres,
            "redis" => InfraKind::Redis,
            _ => InfraKind::GenericTcp,
        }
    }
}

#[async_trait::async_trait]
pub trait HealthCheck {
    async fn check(&self) -> HealthResult;
    fn name(&self) -> &str;
}

pub struct PostgresHealthCheck {
    options: PgConnectOptions,
}

impl PostgresHealthCheck {
    pub fn new(host: &str, port: u16, credentials: &PostgresCredentials) -> Self {
        let options = PgConnectOptions::new()
            .host(host)
            .port(port)
            .username(&credentials.user)
            .password(&credentials.password)
            .database(&credentials.database);

        Self { options }
    }

    async fn probe(&self) -> Result<(), sqlx::Error> {
        let mut conn = PgConnection::connect_with(&self.options).await?;
        // A bare string runs over the simple query protocol; nothing is prepared.
        conn.execute("SELECT 1").await?;
        conn.close().await
    }
}

#[async_trait::async_trait]
impl HealthCheck for PostgresHealthCheck {
    async fn check(&self) -> HealthResult {
        match self.probe().await {
            Ok(()) => HealthResult::healthy("PostgreSQL connection successful"),
            Err(e) => HealthResult::unhealthy(e.to_string()),
        }
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

pub struct RedisHealthCheck {
    host: String,
    port: u16,
}

impl RedisHealthCheck {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    async fn probe(&self) -> redis::RedisResult<()> {
        let info = redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: redis::RedisConnectionInfo::default(),
        };
        let client = redis::Client::open(info)?;
        let mut conn = client.get_multiplexed_async_connection().await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong != "PONG" {
            return Err(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "Unexpected PING reply",
                pong,
            )));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl HealthCheck for RedisHealthCheck {
    async fn check(&self) -> HealthResult {
        match self.probe().await {
            Ok(()) => HealthResult::healthy("Redis ping successful"),
            Err(e) => HealthResult::unhealthy(e.to_string()),
        }
    }

    fn name(&self) -> &str {
        "redis"
    }
}

pub struct TcpHealthCheck {
    host: String,
    port: u16,
}

impl TcpHealthCheck {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait::async_trait]
impl HealthCheck for TcpHealthCheck {
    async fn check(&self) -> HealthResult {
        match TcpStream::connect((self.host.as_str(), self.port)).await {
            Ok(mut stream) => {
                // Closing is best effort; the connect already proved liveness.
                let _ = stream.shutdown().await;
                HealthResult::healthy(format!(
                    "TCP connection to {}:{} successful",
                    self.host, self.port
                ))
            }
            Err(e) => HealthResult::unhealthy(e.to_string()),
        }
    }

    fn name(&self) -> &str {
        "tcp"
    }
}

/// Runs the probe chosen for the configured infrastructure type, bounded by
/// the probe timeout.
pub struct HealthDispatcher {
    kind: InfraKind,
    target: String,
    timeout: Duration,
    check: Box<dyn HealthCheck + Send + Sync>,
}

impl HealthDispatcher {
    pub fn from_config(config: &InfrastructureConfig) -> Self {
        let kind = InfraKind::from_service_type(&config.service_type);
        let check: Box<dyn HealthCheck + Send + Sync> = match kind {
            InfraKind::Postgres => Box::new(PostgresHealthCheck::new(
                &config.host,
                config.port,
                &config.postgres,
            )),
            InfraKind::Redis => Box::new(RedisHealthCheck::new(config.host.clone(), config.port)),
            InfraKind::GenericTcp => Box::new(TcpHealthCheck::new(config.host.clone(), config.port)),
        };

        Self {
            kind,
            target: config.target(),
            timeout: config.probe_timeout(),
            check,
        }
    }

    pub fn new<T: HealthCheck + Send + Sync + 'static>(
        kind: InfraKind,
        target: impl Into<String>,
        timeout: Duration,
        check: T,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            timeout,
            check: Box::new(check),
        }
    }

    pub fn kind(&self) -> InfraKind {
        self.kind
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn check(&self) -> HealthResult {
        let name = self.check.name();
        let start = Instant::now();

        debug!("Probing {} at {}", name, self.target);

        let result = match tokio::time::timeout(self.timeout, self.check.check()).await {
            Ok(result) => result,
            Err(_) => HealthResult::unhealthy(format!(
                "{} health check against {} timed out after {:?}",
                name, self.target, self.timeout
            )),
        };

        let elapsed = start.elapsed();
        match result.status {
            HealthStatus::Healthy => {
                info!("Health check '{}' passed in {:?}", name, elapsed);
            }
            HealthStatus::Unhealthy => {
                error!("Health check '{}' failed in {:?}: {}", name, elapsed, result.details);
            }
        }

        result
    }
}
