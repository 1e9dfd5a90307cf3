// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_BUFFER_LENGTH, DEFAULT_MEMORY_CACHE_THRESHOLD, MAX_BUFFER_LENGTH};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Rule-level configuration relevant to sink execution.
///
/// # Example
/// ```yaml
/// options:
///   send_error: false
/// sink:
///   resend_interval_ms: 500
///   enable_cache: true
///   memory_cache_threshold: 256
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RuleConfig {
    #[serde(default)]
    pub options: RuleOption,
    #[serde(default)]
    pub sink: SinkConf,
}

/// Options shared by every operator of a rule.
///
/// # Fields
/// * `send_error` - Forward upstream error records to sinks instead of dropping them
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleOption {
    pub send_error: bool,
}

impl Default for RuleOption {
    fn default() -> Self {
        Self { send_error: true }
    }
}

/// Buffering, caching and resend settings of one sink.
///
/// Caching modes:
/// 1. `enable_cache` turns on caching; the input buffer becomes the memory cache.
/// 2. `resend_interval_ms` with `buffer_length` retries failed records in place.
/// 3. Otherwise records that cannot be sent are dropped.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SinkConf {
    pub resend_interval_ms: i64,
    pub enable_cache: bool,
    pub resend_alter_queue: bool,
    pub memory_cache_threshold: usize,
    pub buffer_length: usize,
}

impl Default for SinkConf {
    fn default() -> Self {
        Self {
            resend_interval_ms: 0,
            enable_cache: false,
            resend_alter_queue: false,
            memory_cache_threshold: DEFAULT_MEMORY_CACHE_THRESHOLD,
            buffer_length: DEFAULT_BUFFER_LENGTH,
        }
    }
}

impl SinkConf {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let conf: SinkConf = serde_yaml::from_str(content)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resend_interval_ms < 0 {
            return Err(ConfigError::Invalid(format!(
                "resend_interval_ms must not be negative, got {}",
                self.resend_interval_ms
            )));
        }
        if self.enable_cache && self.memory_cache_threshold == 0 {
            return Err(ConfigError::Invalid(
                "memory_cache_threshold must be positive when enable_cache is set".to_string(),
            ));
        }
        for (field, value) in [
            ("buffer_length", self.buffer_length),
            ("memory_cache_threshold", self.memory_cache_threshold),
        ] {
            if value > MAX_BUFFER_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "{} must not exceed {}, got {}",
                    field, MAX_BUFFER_LENGTH, value
                )));
            }
        }
        Ok(())
    }
}

/// Load a rule config from a YAML file and validate its sink settings
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RuleConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: RuleConfig = serde_yaml::from_str(&content)?;
    cfg.sink.validate()?;
    Ok(cfg)
}
