//! Operation scheduling
//!
//! The render loop drives an [`OperationScheduler`] once per frame. Every
//! registered [`ScheduledOperation`] is advanced with the same game time,
//! frame time and [`crate::foundation::time::TimingMode`], in registration
//! order.
//!
//! ```text
//! render loop ──update(game_time, frame_time)──▶ OperationScheduler
//!                                                   ├── ValueInterpolator
//!                                                   ├── Interval
//!                                                   ├── focusers / monitors
//!                                                   └── one-shot requests ──▶ SchedOpsPool
//! ```

pub mod operation;
pub(crate) mod context;
pub mod operation_scheduler;
pub mod interval;
pub mod interpolator;

pub use operation::{OperationError, OperationFlags, OperationState, ScheduledOperation};
pub use context::FrameContext;
pub use operation_scheduler::{OperationId, OperationInfo, OperationScheduler};
pub use interval::{FnHandler, Interval, IntervalClock, IntervalControl, IntervalHandler};
pub use interpolator::{Completion, InterpolationTarget, InterpolatorState, ScalarProperty, ValueInterpolator};
