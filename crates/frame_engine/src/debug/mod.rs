//! Debug instrumentation driven by the scheduler

pub mod performance;

pub use performance::{FrameStats, PerformanceMonitor};
