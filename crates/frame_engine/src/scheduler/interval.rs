//! Resolution-limited periodic operations

use crate::scheduler::{FrameContext, OperationError, OperationState, ScheduledOperation};

/// Rate limiter shared by intervals and interpolators
///
/// Fires at most once per `resolution` window. Missed windows are not
/// replayed: after a long frame the clock fires once and restarts its window
/// from the current game time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalClock {
    resolution: i64,
    last_hit: Option<i64>,
}

impl IntervalClock {
    /// Create a clock; a negative resolution is a configuration error
    pub fn new(resolution: i64) -> Result<Self, OperationError> {
        if resolution < 0 {
            return Err(OperationError::InvalidConfiguration(format!(
                "interval resolution must not be negative, got {resolution}"
            )));
        }
        Ok(Self { resolution, last_hit: None })
    }

    /// Clock that fires on every poll
    pub const fn every_frame() -> Self {
        Self { resolution: 0, last_hit: None }
    }

    /// Returns `true` if the interval is hit at `game_time`
    pub fn poll(&mut self, game_time: i64) -> bool {
        match self.last_hit {
            Some(last) if game_time - last < self.resolution => false,
            _ => {
                self.last_hit = Some(game_time);
                true
            }
        }
    }

    /// Forget the last hit, so the next poll fires
    pub fn reset(&mut self) {
        self.last_hit = None;
    }

    /// Minimum time between two hits
    pub fn resolution(&self) -> i64 {
        self.resolution
    }
}

/// Whether an interval keeps running after a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalControl {
    /// Keep firing
    Continue,
    /// Kill the interval
    Stop,
}

/// Behavior invoked by an [`Interval`]
pub trait IntervalHandler {
    /// Fired once, right before the first hit
    fn on_interval_started(&mut self, _frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        Ok(())
    }

    /// Fired at most once per resolution window
    fn on_interval_hit(&mut self, frame: &mut FrameContext<'_>) -> Result<IntervalControl, OperationError>;
}

/// Adapter running a closure as an [`IntervalHandler`]
pub struct FnHandler<F>(F);

impl<F> IntervalHandler for FnHandler<F>
where
    F: FnMut(&mut FrameContext<'_>) -> Result<IntervalControl, OperationError>,
{
    fn on_interval_hit(&mut self, frame: &mut FrameContext<'_>) -> Result<IntervalControl, OperationError> {
        (self.0)(frame)
    }
}

/// Scheduled operation calling its handler no more often than its resolution
pub struct Interval<H> {
    state: OperationState,
    clock: IntervalClock,
    started: bool,
    handler: H,
}

impl<H: IntervalHandler> Interval<H> {
    /// Create an interval around a handler
    ///
    /// # Arguments
    /// * `resolution` - Minimum game time between two hits; 0 fires every frame
    /// * `persistent` - Whether the interval stays registered once it stops
    /// * `handler` - Behavior run on start and on every hit
    pub fn new(resolution: i64, persistent: bool, handler: H) -> Result<Self, OperationError> {
        Ok(Self {
            state: OperationState::new(persistent),
            clock: IntervalClock::new(resolution)?,
            started: false,
            handler,
        })
    }

    /// Minimum time between two hits
    pub fn resolution(&self) -> i64 {
        self.clock.resolution()
    }

    /// Whether the first hit happened
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// The wrapped handler
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<F> Interval<FnHandler<F>> {
    /// Interval running a closure on every hit
    pub fn from_fn(resolution: i64, persistent: bool, f: F) -> Result<Self, OperationError>
    where
        F: FnMut(&mut FrameContext<'_>) -> Result<IntervalControl, OperationError>,
    {
        Self::new(resolution, persistent, FnHandler(f))
    }
}

impl<H: IntervalHandler> ScheduledOperation for Interval<H> {
    fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        if !self.clock.poll(frame.game_time()) {
            return Ok(());
        }
        if !self.started {
            self.started = true;
            self.handler.on_interval_started(frame)?;
        }
        if self.handler.on_interval_hit(frame)? == IntervalControl::Stop {
            self.state.set_alive(false);
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    fn set_alive(&mut self, alive: bool) {
        if alive && !self.state.is_alive() {
            self.clock.reset();
        }
        self.state.set_alive(alive);
    }

    fn is_persistent(&self) -> bool {
        self.state.is_persistent()
    }
}
