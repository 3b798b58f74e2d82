//! Configuration types for hydro-book

use crate::feed::{HydroFeedConfig, HYDRO_WS_URL};
use crate::market::{MarketClientConfig, HYDRO_API_URL};
use serde::Deserialize;
use std::time::Duration;

/// Example configuration shipped with the crate, used when no file is found
pub const EXAMPLE_CONFIG: &str = include_str!("../config.toml.example");

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Order book feed configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// WebSocket URL
    pub ws_url: String,
    /// Maximum reconnection attempts (0 = infinite)
    pub max_reconnects: u32,
    /// Initial reconnection delay in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum reconnection delay in milliseconds
    pub max_delay_ms: u64,
    /// Event channel capacity
    pub buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: HYDRO_WS_URL.to_string(),
            max_reconnects: 0,
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            buffer_size: 1024,
        }
    }
}

impl From<&FeedConfig> for HydroFeedConfig {
    fn from(config: &FeedConfig) -> Self {
        Self {
            ws_url: config.ws_url.clone(),
            max_reconnects: config.max_reconnects,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            buffer_size: config.buffer_size.max(1),
        }
    }
}

/// Market metadata API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// REST API base URL
    pub api_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_url: HYDRO_API_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl From<&MarketConfig> for MarketClientConfig {
    fn from(config: &MarketConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Terminal rendering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Levels shown per side
    pub depth: usize,
    /// Use ANSI colours
    pub color: bool,
    /// Clear the screen before each frame
    pub clear_screen: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            depth: 10,
            color: true,
            clear_screen: true,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Port for the Prometheus exporter; disabled when absent
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The bundled example configuration
    pub fn example() -> anyhow::Result<Self> {
        Ok(toml::from_str(EXAMPLE_CONFIG)?)
    }
}
