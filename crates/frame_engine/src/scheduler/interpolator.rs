//! Time-windowed scalar interpolation
//!
//! A [`ValueInterpolator`] blends a scalar from `start_val` to `end_val`
//! over `total_time` units of game time and pushes every intermediate value
//! into an [`InterpolationTarget`].
//!
//! ```text
//! Pending ──first hit──▶ Running ──norm reaches 1.0──▶ Finished
//!    ▲                                                   │
//!    └──────────────── revived (persistent) ◀────────────┘
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::foundation::math::utils;
use crate::scheduler::{FrameContext, IntervalClock, OperationError, OperationState, ScheduledOperation};

/// Lifecycle of an interpolator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolatorState {
    /// Not hit yet; start time unknown
    Pending,
    /// Start time captured, values being applied
    Running,
    /// End value applied
    Finished,
}

/// What an interpolator does after reaching its end value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    /// Kill the operation
    #[default]
    Kill,
    /// Start over from the current game time
    Restart,
}

/// Receiver of interpolated values
pub trait InterpolationTarget {
    /// Apply a concrete value
    fn apply_value(&mut self, value: f32) -> Result<(), OperationError>;

    /// Apply a normalized progress in `[0, 1]`
    ///
    /// Called on every hit, including the final one with `norm == 1.0`. The
    /// default blends linearly and hands the result to [`apply_value`](Self::apply_value).
    fn apply_norm_value(&mut self, norm: f32, start_val: f32, end_val: f32) -> Result<(), OperationError> {
        self.apply_value(utils::lerp(start_val, end_val, norm))
    }

    /// Called once each time the end value has been applied
    fn on_interpolation_finished(&mut self, _frame: &mut FrameContext<'_>) -> Completion {
        Completion::Kill
    }
}

impl<F: FnMut(f32)> InterpolationTarget for F {
    fn apply_value(&mut self, value: f32) -> Result<(), OperationError> {
        self(value);
        Ok(())
    }
}

/// Shared scalar property driven by an interpolator
#[derive(Debug, Clone, Default)]
pub struct ScalarProperty(Rc<Cell<f32>>);

impl ScalarProperty {
    /// Create a property holding `value`
    pub fn new(value: f32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    /// Current value
    pub fn get(&self) -> f32 {
        self.0.get()
    }

    /// Overwrite the value
    pub fn set(&self, value: f32) {
        self.0.set(value);
    }
}

impl InterpolationTarget for ScalarProperty {
    fn apply_value(&mut self, value: f32) -> Result<(), OperationError> {
        self.set(value);
        Ok(())
    }
}

/// Scheduled operation interpolating a scalar over a time window
pub struct ValueInterpolator<T> {
    state: OperationState,
    clock: IntervalClock,
    phase: InterpolatorState,
    start_time: i64,
    total_time: i64,
    start_val: f32,
    end_val: f32,
    delta_val: f32,
    target: T,
    next: Option<Box<dyn ScheduledOperation>>,
}

impl<T: InterpolationTarget> ValueInterpolator<T> {
    /// One-shot interpolator updated every frame
    ///
    /// A `total_time` of zero or less completes on the first update.
    ///
    /// # Arguments
    /// * `total_time` - Duration of the sweep, in the scheduler's timing mode
    /// * `start_val` - Value applied on the first update
    /// * `end_val` - Value applied once `total_time` has elapsed
    /// * `target` - Receiver of each blended value
    ///
    /// # Example
    /// ```
    /// use frame_engine::foundation::time::TimingMode;
    /// use frame_engine::scheduler::{OperationScheduler, ScalarProperty, ValueInterpolator};
    ///
    /// let fade = ScalarProperty::new(0.0);
    /// let mut scheduler = OperationScheduler::default();
    /// scheduler.schedule_operation(ValueInterpolator::new(100, 0.0, 1.0, fade.clone()));
    ///
    /// scheduler.update(0, 0, TimingMode::Milliseconds);
    /// scheduler.update(50, 50, TimingMode::Milliseconds);
    /// assert_eq!(fade.get(), 0.5);
    /// scheduler.update(100, 50, TimingMode::Milliseconds);
    /// assert_eq!(fade.get(), 1.0);
    /// assert!(scheduler.is_empty());
    /// ```
    pub fn new(total_time: i64, start_val: f32, end_val: f32, target: T) -> Self {
        Self {
            state: OperationState::one_shot(),
            clock: IntervalClock::every_frame(),
            phase: InterpolatorState::Pending,
            start_time: 0,
            total_time,
            start_val,
            end_val,
            delta_val: end_val - start_val,
            target,
            next: None,
        }
    }

    /// Limit how often values are applied
    pub fn with_resolution(mut self, resolution: i64) -> Result<Self, OperationError> {
        self.clock = IntervalClock::new(resolution)?;
        Ok(self)
    }

    /// Keep the interpolator registered after it finishes, so it can be revived
    pub fn persistent(mut self) -> Self {
        self.state = OperationState::persistent();
        self
    }

    /// Schedule `operation` when this interpolator finishes
    pub fn then<O: ScheduledOperation + 'static>(mut self, operation: O) -> Self {
        self.next = Some(Box::new(operation));
        self
    }

    /// Current lifecycle state
    pub fn interpolator_state(&self) -> InterpolatorState {
        self.phase
    }

    /// Game time of the first hit, once started
    pub fn start_time(&self) -> Option<i64> {
        (self.phase != InterpolatorState::Pending).then_some(self.start_time)
    }

    /// Duration of the interpolation
    pub fn total_time(&self) -> i64 {
        self.total_time
    }

    /// Value applied at the start
    pub fn start_val(&self) -> f32 {
        self.start_val
    }

    /// Value applied at completion
    pub fn end_val(&self) -> f32 {
        self.end_val
    }

    /// `end_val - start_val`
    pub fn delta_val(&self) -> f32 {
        self.delta_val
    }

    /// The receiver of interpolated values
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Normalized progress at `game_time`, clamped to `[0, 1]`
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn norm_value(&self, game_time: i64) -> f32 {
        if self.total_time <= 0 {
            return 1.0;
        }
        let elapsed = (game_time - self.start_time) as f64;
        (elapsed / self.total_time as f64).clamp(0.0, 1.0) as f32
    }

    fn finish(&mut self, frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        self.target.apply_norm_value(1.0, self.start_val, self.end_val)?;
        self.phase = InterpolatorState::Finished;
        if let Some(next) = self.next.take() {
            frame.schedule_boxed(next);
        }
        match self.target.on_interpolation_finished(frame) {
            Completion::Kill => self.state.set_alive(false),
            Completion::Restart => {
                self.phase = InterpolatorState::Running;
                self.start_time = frame.game_time();
            }
        }
        Ok(())
    }
}

impl<T: InterpolationTarget> ScheduledOperation for ValueInterpolator<T> {
    fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        if self.phase == InterpolatorState::Finished {
            // Revived after completion
            self.phase = InterpolatorState::Pending;
            self.clock.reset();
        }
        if !self.clock.poll(frame.game_time()) {
            return Ok(());
        }
        if self.phase == InterpolatorState::Pending {
            self.start_time = frame.game_time();
            self.phase = InterpolatorState::Running;
        }

        let norm = self.norm_value(frame.game_time());
        if norm >= 1.0 {
            self.finish(frame)
        } else {
            self.target.apply_norm_value(norm, self.start_val, self.end_val)
        }
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
