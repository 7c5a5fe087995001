//! Core engine implementation

use std::cell::Cell;
use std::rc::Rc;

use crate::{
    application::Application,
    config::{Config, ConfigError},
    core::EngineConfig,
    debug::{FrameStats, PerformanceMonitor},
    foundation::{logging, time::Timer},
    pool::SchedOpsPool,
    scheduler::OperationScheduler,
};
use thiserror::Error;

/// Main engine struct
///
/// Owns the operation scheduler and the frame timer, and drives the
/// scheduler once per frame.
pub struct Engine {
    scheduler: OperationScheduler,
    timer: Timer,
    config: EngineConfig,
    game_time: i64,
    running: bool,
    frame_stats: Option<Rc<Cell<FrameStats>>>,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        logging::init_with_filter(&config.logging.default_filter);
        config.validate()?;
        log::info!("Initializing engine ({:?} timing)...", config.timing_mode);

        let mut scheduler = OperationScheduler::new(SchedOpsPool::new(&config.pools));
        let frame_stats = if config.debug.performance_monitor {
            let monitor = PerformanceMonitor::from_millis(config.timing_mode, config.debug.report_interval_ms)
                .map_err(|e| EngineError::InitializationFailed(format!("Performance monitor: {}", e)))?;
            let stats = monitor.stats_handle();
            scheduler.schedule_operation(monitor);
            Some(stats)
        } else {
            None
        };

        Ok(Self {
            scheduler,
            timer: Timer::new(config.timing_mode),
            config,
            game_time: 0,
            running: true,
            frame_stats,
        })
    }

    /// Run the engine main loop with the given application
    ///
    /// Returns once the application has quit, been cleaned up, and every
    /// background screenshot has been written.
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> Result<(), EngineError> {
        let mut engine = Self::new(config)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))?;

        log::info!("Starting main loop...");
        engine.timer = Timer::new(engine.config.timing_mode);

        while engine.running {
            let (game_time, frame_time) = engine.timer.tick();

            app.update(&mut engine, frame_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;

            engine.step(game_time, frame_time);
        }

        app.cleanup(&mut engine);
        engine.scheduler.pools().join_screenshot_workers();

        log::info!(
            "Engine shutdown complete after {} frames",
            engine.scheduler.frame_count()
        );
        Ok(())
    }

    /// Advance every scheduled operation to `game_time`
    ///
    /// For hosts that run their own loop and clock.
    pub fn step(&mut self, game_time: i64, frame_time: i64) {
        self.game_time = game_time;
        self.scheduler.update(game_time, frame_time, self.config.timing_mode);
    }

    /// Advance game time by a fixed `frame_time` and step
    pub fn advance(&mut self, frame_time: i64) {
        self.step(self.game_time + frame_time, frame_time);
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the operation scheduler
    pub fn scheduler(&self) -> &OperationScheduler {
        &self.scheduler
    }

    /// Get mutable access to the operation scheduler
    pub fn scheduler_mut(&mut self) -> &mut OperationScheduler {
        &mut self.scheduler
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Game time of the last step
    pub fn game_time(&self) -> i64 {
        self.game_time
    }

    /// Latest performance report, when the monitor is enabled
    pub fn frame_stats(&self) -> Option<FrameStats> {
        self.frame_stats.as_ref().map(|stats| stats.get())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("scheduler", &self.scheduler)
            .field("game_time", &self.game_time)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Subsystem initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}
