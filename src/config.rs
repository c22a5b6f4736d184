//! config.rs
//! Immutable acquisition settings, fixed at startup and shared read-only by the
//! acquirer and the consumer.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::error::{AcquireError, AcquireResult};

pub const DEFAULT_CHANNELS: usize = 1;
pub const DEFAULT_WINDOW: usize = 200;
pub const DEFAULT_BAUD: u32 = 115_200;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_JOIN_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_SIM_STEP: f64 = 0.05;
pub const DEFAULT_SIM_INTERVAL_MS: u64 = 50;
pub const DEFAULT_REFRESH_MS: u64 = 50;

/// Where raw samples come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Synthetic sinusoids, no hardware required.
    Simulated,
    /// Serial device such as `/dev/ttyUSB0` or `COM3`.
    Serial { port: String, baud: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub channels: usize,
    pub window: usize,
    pub delimiter: Option<String>,
    pub source: SourceConfig,
    pub read_timeout_ms: u64,
    pub join_timeout_ms: u64,
    pub sim_step: f64,
    pub sim_interval_ms: u64,
    pub refresh_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            window: DEFAULT_WINDOW,
            delimiter: None,
            source: SourceConfig::Simulated,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            join_timeout_ms: DEFAULT_JOIN_TIMEOUT_MS,
            sim_step: DEFAULT_SIM_STEP,
            sim_interval_ms: DEFAULT_SIM_INTERVAL_MS,
            refresh_ms: DEFAULT_REFRESH_MS,
        }
    }
}

impl AcquisitionConfig {
    pub fn simulated(channels: usize, window: usize) -> Self {
        Self {
            channels,
            window,
            ..Self::default()
        }
    }

    pub fn serial(port: impl Into<String>, baud: u32, channels: usize, window: usize) -> Self {
        Self {
            channels,
            window,
            source: SourceConfig::Serial {
                port: port.into(),
                baud,
            },
            ..Self::default()
        }
    }

    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> AcquireResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| AcquireError::InvalidConfig(format!("config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> AcquireResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| AcquireError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn test_mode(&self) -> bool {
        self.source == SourceConfig::Simulated
    }

    /// Delimiter to split on; an empty string means whitespace splitting.
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref().filter(|d| !d.is_empty())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    pub fn sim_interval(&self) -> Duration {
        Duration::from_millis(self.sim_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn validate(&self) -> AcquireResult<()> {
        if self.channels < 1 {
            return Err(AcquireError::InvalidConfig("channels must be >= 1".into()));
        }
        if self.window < 1 {
            return Err(AcquireError::InvalidConfig("window must be >= 1".into()));
        }
        if self.read_timeout_ms == 0 {
            return Err(AcquireError::InvalidConfig("read timeout must be non-zero".into()));
        }
        if self.join_timeout_ms == 0 {
            return Err(AcquireError::InvalidConfig("join timeout must be non-zero".into()));
        }
        if !self.sim_step.is_finite() {
            return Err(AcquireError::InvalidConfig("simulation step must be finite".into()));
        }
        if let SourceConfig::Serial { port, .. } = &self.source {
            if port.trim().is_empty() {
                return Err(AcquireError::InvalidConfig("serial port must not be empty".into()));
            }
        }
        Ok(())
    }
}
