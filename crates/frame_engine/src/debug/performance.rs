//! Frame time statistics
//!
//! [`PerformanceMonitor`] is a persistent scheduled operation. It accumulates
//! the frame time it is handed each frame and, once a full report interval
//! has accumulated, logs a summary and publishes it through a shared
//! [`FrameStats`] handle.

use std::cell::Cell;
use std::rc::Rc;

use crate::foundation::time::TimingMode;
use crate::scheduler::{FrameContext, OperationError, OperationState, ScheduledOperation};

/// Summary of the last completed report interval
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames in the interval
    pub frames: u32,
    /// Mean frame time in milliseconds
    pub average_ms: f64,
    /// Shortest frame in milliseconds
    pub min_ms: f64,
    /// Longest frame in milliseconds
    pub max_ms: f64,
    /// Frames per second over the interval
    pub fps: f64,
}

/// Persistent operation reporting frame timing
pub struct PerformanceMonitor {
    state: OperationState,
    report_interval: i64,
    accumulated: i64,
    frames: u32,
    total_ms: f64,
    min_ms: f64,
    max_ms: f64,
    stats: Rc<Cell<FrameStats>>,
}

impl PerformanceMonitor {
    /// Report every `report_interval` units of accumulated frame time
    pub fn new(report_interval: i64) -> Result<Self, OperationError> {
        if report_interval <= 0 {
            return Err(OperationError::InvalidConfiguration(format!(
                "report interval must be positive, got {report_interval}"
            )));
        }
        Ok(Self {
            state: OperationState::persistent(),
            report_interval,
            accumulated: 0,
            frames: 0,
            total_ms: 0.0,
            min_ms: f64::INFINITY,
            max_ms: 0.0,
            stats: Rc::new(Cell::new(FrameStats::default())),
        })
    }

    /// Report every `millis` milliseconds, expressed in `timing_mode` units
    pub fn from_millis(timing_mode: TimingMode, millis: f64) -> Result<Self, OperationError> {
        Self::new(timing_mode.from_millis(millis))
    }

    /// Shared handle updated after every report
    pub fn stats_handle(&self) -> Rc<Cell<FrameStats>> {
        Rc::clone(&self.stats)
    }

    /// Interval length in scheduler time units
    pub fn report_interval(&self) -> i64 {
        self.report_interval
    }

    fn reset_window(&mut self) {
        self.accumulated = 0;
        self.frames = 0;
        self.total_ms = 0.0;
        self.min_ms = f64::INFINITY;
        self.max_ms = 0.0;
    }
}

impl ScheduledOperation for PerformanceMonitor {
    fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        let frame_ms = frame.frame_millis();
        self.accumulated += frame.frame_time();
        self.frames += 1;
        self.total_ms += frame_ms;
        self.min_ms = self.min_ms.min(frame_ms);
        self.max_ms = self.max_ms.max(frame_ms);

        if self.accumulated >= self.report_interval {
            let seconds = frame.timing_mode().to_seconds(self.accumulated);
            let stats = FrameStats {
                frames: self.frames,
                average_ms: self.total_ms / f64::from(self.frames),
                min_ms: self.min_ms,
                max_ms: self.max_ms,
                fps: f64::from(self.frames) / seconds,
            };
            log::info!(
                "{:.1} fps, frame time avg {:.2} ms (min {:.2}, max {:.2}) over {} frames",
                stats.fps,
                stats.average_ms,
                stats.min_ms,
                stats.max_ms,
                stats.frames
            );
            self.stats.set(stats);
            self.reset_window();
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    fn set_alive(&mut self, alive: bool) {
        self.state.set_alive(alive);
    }

    fn is_persistent(&self) -> bool {
        self.state.is_persistent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::OperationScheduler;
    use approx::assert_relative_eq;

    #[test]
    fn test_reports_after_full_interval() {
        let monitor = PerformanceMonitor::new(1000).unwrap();
        let stats = monitor.stats_handle();
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(monitor);

        let mut game_time = 0;
        for frame_time in [10, 30, 20, 40] {
            game_time += frame_time;
            scheduler.update(game_time, frame_time, TimingMode::Milliseconds);
        }
        assert_eq!(stats.get(), FrameStats::default());

        // 90 more 10 ms frames complete the one second window
        for _ in 0..90 {
            game_time += 10;
            scheduler.update(game_time, 10, TimingMode::Milliseconds);
        }
        let report = stats.get();
        assert_eq!(report.frames, 94);
        assert_relative_eq!(report.average_ms, 1000.0 / 94.0, epsilon = 1e-9);
        assert_relative_eq!(report.min_ms, 10.0);
        assert_relative_eq!(report.max_ms, 40.0);
        assert_relative_eq!(report.fps, 94.0, epsilon = 1e-9);
    }

    #[test]
    fn test_microsecond_timing() {
        let monitor = PerformanceMonitor::from_millis(TimingMode::Microseconds, 100.0).unwrap();
        assert_eq!(monitor.report_interval(), 100_000);
        let stats = monitor.stats_handle();
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(monitor);

        for i in 1..=10 {
            scheduler.update(i * 10_000, 10_000, TimingMode::Microseconds);
        }
        let report = stats.get();
        assert_eq!(report.frames, 10);
        assert_relative_eq!(report.average_ms, 10.0, epsilon = 1e-9);
        assert_relative_eq!(report.fps, 100.0, epsilon = 1e-9);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_non_positive_interval_rejected() {
        assert!(PerformanceMonitor::new(0).is_err());
        assert!(PerformanceMonitor::new(-5).is_err());
    }
}
