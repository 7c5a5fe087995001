//! Ready-made one-shot operations
//!
//! Screenshots and pickers come from the scheduler's [`crate::pool::SchedOpsPool`]
//! and return to it once they ran:
//!
//! ```ignore
//! let mut shot = scheduler.pools_mut().allocate_screenshot();
//! shot.configure(grabber, "frame.png");
//! scheduler.schedule_operation(shot);
//! ```

pub mod screenshot;
pub mod picker;
pub mod traversal;

pub use screenshot::{FrameGrabber, ScheduledScreenshot, ScreenshotWorkers};
pub use picker::ScheduledPicker;
pub use traversal::ScheduledTraversal;
