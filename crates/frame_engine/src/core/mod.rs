//! # Core Engine Module
//!
//! Shared configuration consumed by the engine driver and its subsystems.
//!
//! ## Organization
//!
//! - **Config**: Engine, pool, debug and logging settings

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    EngineConfig,
    PoolConfig,
    DebugConfig,
    LoggingConfig,
};
pub use crate::config::{Config, ConfigError, ConfigFormat};
