//! Service configuration loaded from environment variables.
//!
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `QUOTE_STORAGE` - `file` (default) or `memory`
//! - `QUOTE_DATA_DIR` - Root directory for file storage (default: data/quotes)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Files(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub storage: StorageBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = match lookup("HOST") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidEnvVar("HOST".into(), v))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidEnvVar("PORT".into(), v))?,
            None => 8083,
        };
        let data_dir = lookup("QUOTE_DATA_DIR").map_or_else(|| PathBuf::from("data/quotes"), PathBuf::from);
        let storage = match lookup("QUOTE_STORAGE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("file") => StorageBackend::Files(data_dir),
            Some("memory") => StorageBackend::Memory,
            Some(other) => return Err(ConfigError::InvalidEnvVar("QUOTE_STORAGE".into(), other.to_string())),
        };
        Ok(Self { host, port, storage })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}
