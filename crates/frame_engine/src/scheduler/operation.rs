//! Scheduled operation trait and shared operation state

use bitflags::bitflags;
use thiserror::Error;

use crate::joints::JointError;
use crate::pool::SchedOpsPool;
use crate::scene::SceneError;
use crate::scheduler::FrameContext;

/// Errors raised while building or updating a scheduled operation
#[derive(Error, Debug)]
pub enum OperationError {
    /// The operation was configured with values it cannot work with
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Frame capture failed
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Image encoding or writing failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene graph operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Joint update failed
    #[error("Joint error: {0}")]
    Joint(#[from] JointError),

    /// Custom operation error
    #[error("{0}")]
    Custom(String),
}

bitflags! {
    /// Diagnostic summary of an operation's scheduling state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperationFlags: u8 {
        /// The operation is updated each frame
        const ALIVE = 0b0001;
        /// The operation stays registered after it dies
        const PERSISTENT = 0b0010;
        /// The operation returns to an object pool when removed
        const POOLED = 0b0100;
    }
}

/// Unit of per-frame work driven by the [`crate::scheduler::OperationScheduler`]
///
/// The scheduler calls [`update`](Self::update) once per frame while the
/// operation is alive. Once it reports dead, a non-persistent operation is
/// unregistered and handed to [`recycle`](Self::recycle); a persistent one
/// stays registered but dormant until revived or unscheduled.
pub trait ScheduledOperation {
    /// Advance the operation by one frame
    ///
    /// Returning an error removes the operation from the scheduler.
    fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), OperationError>;

    /// Whether the operation still wants updates
    fn is_alive(&self) -> bool;

    /// Mark the operation alive or dead
    fn set_alive(&mut self, alive: bool);

    /// Whether the operation survives its own death
    fn is_persistent(&self) -> bool;

    /// Stop the operation
    fn kill(&mut self) {
        self.set_alive(false);
    }

    /// Whether [`recycle`](Self::recycle) hands the operation back to a pool
    fn is_pooled(&self) -> bool {
        false
    }

    /// Called after the scheduler unregisters the operation
    ///
    /// Pool-eligible operations move themselves back into their pool here.
    fn recycle(self: Box<Self>, pools: &mut SchedOpsPool) {
        let _ = pools;
    }

    /// Name used in log messages
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Flags summarizing the operation's state
    fn flags(&self) -> OperationFlags {
        let mut flags = OperationFlags::empty();
        flags.set(OperationFlags::ALIVE, self.is_alive());
        flags.set(OperationFlags::PERSISTENT, self.is_persistent());
        flags.set(OperationFlags::POOLED, self.is_pooled());
        flags
    }
}

/// Alive/persistent bookkeeping shared by the engine's operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationState {
    alive: bool,
    persistent: bool,
}

impl OperationState {
    /// Create a live state
    pub const fn new(persistent: bool) -> Self {
        Self { alive: true, persistent }
    }

    /// Live state for an operation removed once it dies
    pub const fn one_shot() -> Self {
        Self::new(false)
    }

    /// Live state for an operation that is never auto-removed
    pub const fn persistent() -> Self {
        Self::new(true)
    }

    /// Whether the operation is alive
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark alive or dead
    pub fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    /// Whether the operation is persistent
    pub const fn is_persistent(&self) -> bool {
        self.persistent
    }
}

impl Default for OperationState {
    fn default() -> Self {
        Self::one_shot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_defaults() {
        let state = OperationState::default();
        assert!(state.is_alive());
        assert!(!state.is_persistent());

        let mut persistent = OperationState::persistent();
        persistent.set_alive(false);
        assert!(!persistent.is_alive());
        assert!(persistent.is_persistent());
    }
}
