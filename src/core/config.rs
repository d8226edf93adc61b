use config::Config;
use serde::Deserialize;

use crate::core::error::ConfigError;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct Args {
    pub(crate) port: u16,
    pub(crate) log_level: String,
    pub(crate) secret: String,
    /// seconds
    pub(crate) token_ttl: u64,
    /// seconds
    pub(crate) request_timeout: u64,
    /// seconds
    pub(crate) shutdown_grace: u64,
    pub(crate) bcrypt_cost: u32,
    pub(crate) store: StoreKind,
    pub(crate) database_host: String,
    pub(crate) database_port: u16,
    pub(crate) database_name: String,
    pub(crate) database_user: String,
    pub(crate) database_password: String,
    pub(crate) database_max_connections: u32,
}

impl Args {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("port", 8080)?
            .set_default("log_level", "info")?
            .set_default("token_ttl", 60 * 60 * 24)?
            .set_default("request_timeout", 30)?
            .set_default("shutdown_grace", 10)?
            .set_default("bcrypt_cost", bcrypt::DEFAULT_COST)?
            .set_default("store", "postgres")?
            .set_default("database_host", "localhost")?
            .set_default("database_port", 5432)?
            .set_default("database_name", "microblog")?
            .set_default("database_user", "postgres")?
            .set_default("database_password", "")?
            .set_default("database_max_connections", 5)?
            .add_source(config::Environment::with_prefix("MICROBLOG"))
            .build()?;

        let args = config.try_deserialize::<Args>()?;

        if args.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        Ok(args)
    }

    pub(crate) fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.database_user,
            self.database_password,
            self.database_host,
            self.database_port,
            self.database_name
        )
    }
}
