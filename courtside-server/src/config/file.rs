//! TOML file configuration structures.
//!
//! These structs directly map to the `courtside.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Event queue sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of partitions. Per-match ordering holds at any count; more
    /// partitions means more parallel appliers.
    #[serde(default = "default_partitions")]
    pub partitions: u32,
    /// Per-partition buffer before publishers start waiting.
    #[serde(default = "default_buffer")]
    pub buffer: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
            buffer: default_buffer(),
        }
    }
}

fn default_partitions() -> u32 {
    4
}

fn default_buffer() -> usize {
    courtside_core::queue::DEFAULT_PARTITION_BUFFER
}

/// Database pool sizing. The connection URL itself comes from the
/// `DATABASE_URL` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}
