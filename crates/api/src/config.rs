//! Server settings read from the environment.

use std::net::SocketAddr;

use stockroom_observability::LogFormat;
use thiserror::Error;

pub const BIND_ADDR_ENV: &str = "STOCKROOM_BIND_ADDR";
pub const LOG_FORMAT_ENV: &str = "STOCKROOM_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("STOCKROOM_BIND_ADDR is not a socket address: {0}")]
    BindAddr(String),
    #[error("STOCKROOM_LOG_FORMAT: {0}")]
    LogFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var(BIND_ADDR_ENV).ok().as_deref(),
            std::env::var(LOG_FORMAT_ENV).ok().as_deref(),
        )
    }

    fn from_vars(bind_addr: Option<&str>, log_format: Option<&str>) -> Result<Self, ConfigError> {
        let bind_addr = bind_addr
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|_| ConfigError::BindAddr(bind_addr.unwrap_or_default().to_string()))?;
        let log_format = match log_format {
            Some(raw) => raw.parse().map_err(|e| ConfigError::LogFormat(format!("{e}")))?,
            None => LogFormat::default(),
        };
        Ok(Self { bind_addr, log_format })
    }
}
