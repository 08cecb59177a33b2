use crate::error::{ChainBackoffError, ChainBackoffResult, GasError};
use crate::gas::scale_gas;
use alloy_primitives::U256;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for [`crate::retry::RetryPolicy`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each following one
    pub base_delay_ms: u64,
    /// Delay before the first attempt
    pub initial_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Factor applied to gas estimates (e.g. 1.2 adds 20% headroom)
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Log file path; console only when unset
    pub file: Option<String>,
    /// Emit JSON lines to the log file
    pub json: bool,
    /// Rotate the log file daily
    pub rotation: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            initial_delay_ms: 0,
        }
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self { multiplier: 1.2 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
            rotation: false,
        }
    }
}

impl GasConfig {
    /// Scale a gas estimate by the configured multiplier
    pub fn scale(&self, gas: U256) -> Result<U256, GasError> {
        scale_gas(gas, self.multiplier)
    }

    pub fn validate(&self) -> Result<(), GasError> {
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(GasError::InvalidMultiplier {
                multiplier: self.multiplier,
            });
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config file, using defaults: {}", e);
            Self::default()
        })
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> ChainBackoffResult<()> {
        self.gas.validate()?;

        if self.logging.level.trim().is_empty() {
            return Err(ChainBackoffError::Config(
                "logging.level must not be empty".to_string(),
            ));
        }
        EnvFilter::from_str(&self.logging.level).map_err(|e| {
            ChainBackoffError::Config(format!(
                "invalid logging.level '{}': {}",
                self.logging.level, e
            ))
        })?;

        if self.logging.rotation && self.logging.file.is_none() {
            return Err(ChainBackoffError::Config(
                "logging.rotation requires logging.file".to_string(),
            ));
        }

        Ok(())
    }
}
