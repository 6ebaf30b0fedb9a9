use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variables the sidecar reads. Anything else in the process
/// environment is ignored.
pub const ENV_KEYS: &[&str] = &[
    "GALAXY_SERVICE_NAME",
    "GALAXY_SERVICE_TIER",
    "GALAXY_SERVICE_TEAM",
    "GALAXY_SERVICE_DESCRIPTION",
    "INFRA_SERVICE_HOST",
    "INFRA_SERVICE_PORT",
    "INFRA_SERVICE_TYPE",
    "INFRA_PROBE_TIMEOUT_SECONDS",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "POSTGRES_DB",
    "SIDECAR_HOST",
    "SIDECAR_PORT",
    "SIDECAR_CPU_SAMPLE_MS",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub service: ServiceConfig,
    pub infrastructure: InfrastructureConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Galaxy metadata reported by `/galaxy/info` and friends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub tier: String,
    pub team: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureConfig {
    /// Raw type string as configured; reported back verbatim.
    pub service_type: String,
    pub host: String,
    pub port: u16,
    pub probe_timeout_seconds: u64,
    pub postgres: PostgresCredentials,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PostgresCredentials {
    pub user: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub database: String,
}

impl std::fmt::Debug for PostgresCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCredentials")
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub cpu_sample_interval_ms: u64,
}

/// Flat view of the environment, one field per variable in [`ENV_KEYS`].
#[derive(Debug, Deserialize)]
struct EnvSettings {
    galaxy_service_name: String,
    galaxy_service_tier: String,
    galaxy_service_team: String,
    galaxy_service_description: String,
    infra_service_host: String,
    infra_service_port: u16,
    infra_service_type: String,
    infra_probe_timeout_seconds: u64,
    postgres_user: String,
    postgres_password: String,
    postgres_db: String,
    sidecar_host: String,
    sidecar_port: u16,
    sidecar_cpu_sample_ms: u64,
}

impl From<EnvSettings> for AppConfig {
    fn from(env: EnvSettings) -> Self {
        Self {
            server: ServerConfig {
                host: env.sidecar_host,
                port: env.sidecar_port,
            },
            service: ServiceConfig {
                name: env.galaxy_service_name,
                tier: env.galaxy_service_tier,
                team: env.galaxy_service_team,
                description: env.galaxy_service_description,
            },
            infrastructure: InfrastructureConfig {
                service_type: env.infra_service_type,
                host: env.infra_service_host,
                port: env.infra_service_port,
                probe_timeout_seconds: env.infra_probe_timeout_seconds,
                postgres: PostgresCredentials {
                    user: env.postgres_user,
                    password: env.postgres_password,
                    database: env.postgres_db,
                },
            },
            metrics: MetricsConfig {
                cpu_sample_interval_ms: env.sidecar_cpu_sample_ms,
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            service: ServiceConfig::default(),
            infrastructure: InfrastructureConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "{{SERVICE_NAME}}".to_string(),
            tier: "{{TIER}}".to_string(),
            team: "{{TEAM}}".to_string(),
            description: "{{DESCRIPTION}}".to_string(),
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            service_type: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            probe_timeout_seconds: 5,
            postgres: PostgresCredentials::default(),
        }
    }
}

impl Default for PostgresCredentials {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: String::new(),
            database: "postgres".to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cpu_sample_interval_ms: 1000,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars())
    }

    /// Builds the configuration from an explicit set of variables instead of
    /// the process environment.
    pub fn from_env_map<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let source: config::Map<String, String> = vars
            .into_iter()
            .filter(|(key, _)| ENV_KEYS.iter().any(|known| *known == key.as_ref()))
            .map(|(key, value)| (key.as_ref().to_lowercase(), value.into()))
            .collect();

        let defaults = AppConfig::default();
        let builder = Config::builder()
            .set_default("galaxy_service_name", defaults.service.name)?
            .set_default("galaxy_service_tier", defaults.service.tier)?
            .set_default("galaxy_service_team", defaults.service.team)?
            .set_default("galaxy_service_description", defaults.service.description)?
            .set_default("infra_service_host", defaults.infrastructure.host)?
            .set_default("infra_service_port", i64::from(defaults.infrastructure.port))?
            .set_default("infra_service_type", defaults.infrastructure.service_type)?
            .set_default(
                "infra_probe_timeout_seconds",
                defaults.infrastructure.probe_timeout_seconds,
            )?
            .set_default("postgres_user", defaults.infrastructure.postgres.user)?
            .set_default("postgres_password", defaults.infrastructure.postgres.password)?
            .set_default("postgres_db", defaults.infrastructure.postgres.database)?
            .set_default("sidecar_host", defaults.server.host)?
            .set_default("sidecar_port", i64::from(defaults.server.port))?
            .set_default("sidecar_cpu_sample_ms", defaults.metrics.cpu_sample_interval_ms)?
            .add_source(Environment::default().source(Some(source)));

        let settings: EnvSettings = builder.build()?.try_deserialize()?;
        let app_config = AppConfig::from(settings);

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Sidecar port cannot be 0".to_string()));
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Message("Sidecar host cannot be empty".to_string()));
        }

        if self.infrastructure.port == 0 {
            return Err(ConfigError::Message(
                "INFRA_SERVICE_PORT cannot be 0".to_string(),
            ));
        }

        if self.infrastructure.host.trim().is_empty() {
            return Err(ConfigError::Message(
                "INFRA_SERVICE_HOST cannot be empty".to_string(),
            ));
        }

        if self.infrastructure.service_type.is_empty() {
            return Err(ConfigError::Message(
                "INFRA_SERVICE_TYPE cannot be empty".to_string(),
            ));
        }

        if self.infrastructure.probe_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Probe timeout must be greater than 0".to_string(),
            ));
        }

        if self.metrics.cpu_sample_interval_ms == 0 {
            return Err(ConfigError::Message(
                "CPU sample interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl InfrastructureConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl MetricsConfig {
    pub fn cpu_sample_interval(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_interval_ms)
    }
}
