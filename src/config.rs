// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 the dv-router authors

//! Daemon configuration.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

/// Distance-vector daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local node identity (default: 192.168.1.100)
    #[serde(default = "default_local_ip")]
    pub local_ip: Ipv4Addr,

    /// UDP port for HELLO/DV traffic (default: 5555)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between HELLO beacons (default: 5)
    #[serde(default = "default_hello_interval")]
    pub hello_interval_secs: u64,

    /// Neighbor liveness timeout in seconds (default: 10)
    #[serde(default = "default_neighbor_timeout")]
    pub neighbor_timeout_secs: u64,
}

fn default_local_ip() -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, 100)
}

fn default_port() -> u16 {
    5555
}

fn default_hello_interval() -> u64 {
    5
}

fn default_neighbor_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_ip: default_local_ip(),
            port: default_port(),
            hello_interval_secs: default_hello_interval(),
            neighbor_timeout_secs: default_neighbor_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn hello_interval(&self) -> Duration {
        Duration::from_secs(self.hello_interval_secs)
    }

    pub fn neighbor_timeout(&self) -> Duration {
        Duration::from_secs(self.neighbor_timeout_secs)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port cannot be 0".into()));
        }
        if self.hello_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "hello_interval_secs cannot be 0".into(),
            ));
        }
        if self.neighbor_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "neighbor_timeout_secs cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, Clone)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(s) => write!(f, "I/O error: {}", s),
            Self::ParseError(s) => write!(f, "Parse error: {}", s),
            Self::InvalidValue(s) => write!(f, "Invalid value: {}", s),
        }
    }
}

impl std::error::Error for ConfigError {}
