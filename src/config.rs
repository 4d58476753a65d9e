//! Service configuration, read from the environment.

use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Postgres connection string. Without it the service keeps its data in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    /// `From` address used for moderator notifications.
    pub notification_sender: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: get("HOST", "0.0.0.0"),
            port: parse("PORT", get("PORT", "8083"))?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: parse("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS", "10"))?,
            run_migrations: parse("RUN_MIGRATIONS", get("RUN_MIGRATIONS", "true"))?,
            notification_sender: get("NOTIFICATION_SENDER", "noreply@cinema.local"),
        })
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid { name, value })
}
