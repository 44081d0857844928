//! Configuration module for courtside-server.
//!
//! Handles loading configuration from the TOML file and CLI arguments.
//! The database URL comes from the environment, never the file.

pub mod file;

use file::FileConfig;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Load the TOML config, applying the CLI listen override if given.
pub fn load_config(
    path: &Path,
    listen_override: Option<SocketAddr>,
) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let mut config: FileConfig = toml::from_str(&raw)?;
    if let Some(listen) = listen_override {
        config.server.listen = listen;
    }
    Ok(config)
}

pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
