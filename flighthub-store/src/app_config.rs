use flighthub_core::PaymentDeadline;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    #[serde(default = "default_true")]
    pub seed_flights: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub deadline: PaymentDeadline,
    /// 0 disables the background sweep; expiry is still enforced on read.
    #[serde(default)]
    pub sweep_interval_seconds: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            deadline: PaymentDeadline::default(),
            sweep_interval_seconds: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_true")]
    pub verify_totals: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { verify_totals: true }
    }
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }
fn default_true() -> bool { true }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked per-machine overrides
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. FLIGHTHUB__SERVER__PORT=8080
            .add_source(config::Environment::with_prefix("FLIGHTHUB").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Checks the combinations serde cannot express.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.is_none() {
            return Err(config::ConfigError::Message(
                "storage.backend = \"postgres\" requires a [database] section".to_string(),
            ));
        }
        match self.payments.deadline {
            PaymentDeadline::Hours { hours: 0 } | PaymentDeadline::WorkingDays { days: 0 } => {
                Err(config::ConfigError::Message(
                    "payments.deadline must be longer than zero".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}
