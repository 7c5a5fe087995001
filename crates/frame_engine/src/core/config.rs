//! # Engine Configuration
//!
//! Settings for the frame driver, the scheduler's object pools, debug
//! instrumentation and logging. Every section has sensible defaults, so a
//! configuration file only needs to mention what it overrides.
//!
//! ```toml
//! timing_mode = "Microseconds"
//!
//! [pools]
//! picker_capacity = 256
//!
//! [debug]
//! report_interval_ms = 2000.0
//! ```

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};
use crate::foundation::time::TimingMode;

/// # Pool Configuration
///
/// Nominal capacities of the scheduler's recycling pools. Pools grow past
/// these values when demand requires it, logging a warning when they do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Scheduled screenshot requests
    pub screenshot_capacity: usize,
    /// Scheduled picker requests
    pub picker_capacity: usize,
    /// Reusable node lists
    pub node_list_capacity: usize,
    /// Outstanding objects or byte buffers above which a leak warning is logged
    pub leak_threshold: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            screenshot_capacity: 16,
            picker_capacity: 128,
            node_list_capacity: 128,
            leak_threshold: 10,
        }
    }
}

impl PoolConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let capacities = [
            ("pools.screenshot_capacity", self.screenshot_capacity),
            ("pools.picker_capacity", self.picker_capacity),
            ("pools.node_list_capacity", self.node_list_capacity),
        ];
        for (field, capacity) in capacities {
            if capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "capacity must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// # Debug Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Schedule a performance monitor when the engine starts
    pub performance_monitor: bool,
    /// Milliseconds of game time between two frame statistic reports
    pub report_interval_ms: f64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            performance_monitor: cfg!(debug_assertions),
            report_interval_ms: 1000.0,
        }
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
        }
    }
}

/// # Engine Configuration
///
/// Top-level settings consumed by [`crate::Engine::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Unit of game time and frame time
    pub timing_mode: TimingMode,
    /// Object pool capacities
    pub pools: PoolConfig,
    /// Debug instrumentation
    pub debug: DebugConfig,
    /// Logging defaults
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Builder pattern: set the timing mode
    pub fn with_timing_mode(mut self, timing_mode: TimingMode) -> Self {
        self.timing_mode = timing_mode;
        self
    }

    /// Builder pattern: enable or disable the performance monitor
    pub fn with_performance_monitor(mut self, enabled: bool) -> Self {
        self.debug.performance_monitor = enabled;
        self
    }

    /// Builder pattern: set pool capacities
    pub fn with_pools(mut self, pools: PoolConfig) -> Self {
        self.pools = pools;
        self
    }
}

impl Config for EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.pools.validate()?;
        if !(self.debug.report_interval_ms > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "debug.report_interval_ms",
                reason: format!("must be positive, got {}", self.debug.report_interval_ms),
            });
        }
        if self.logging.default_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.default_filter",
                reason: "filter cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
