//! Per-frame context handed to every scheduled operation

use slotmap::SlotMap;

use crate::foundation::time::TimingMode;
use crate::pool::SchedOpsPool;
use crate::scheduler::{OperationId, ScheduledOperation};

/// Operations currently owned by the scheduler
///
/// A slot holds `None` while its operation is being updated.
pub(crate) type OperationSlots = SlotMap<OperationId, Option<Box<dyn ScheduledOperation>>>;

/// Structural changes requested during a frame pass
#[derive(Default)]
pub(crate) struct PendingChanges {
    pub(crate) added: Vec<OperationId>,
    pub(crate) removed: Vec<OperationId>,
}

/// Frame timing plus deferred access to the scheduler
///
/// Operations scheduled through the context are registered immediately but
/// first run on the next frame. Unscheduled operations are removed after the
/// current pass, so nothing is skipped or updated twice within a frame.
pub struct FrameContext<'a> {
    game_time: i64,
    frame_time: i64,
    timing_mode: TimingMode,
    frame_index: u64,
    slots: &'a mut OperationSlots,
    pending: &'a mut PendingChanges,
    pools: &'a mut SchedOpsPool,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(
        game_time: i64,
        frame_time: i64,
        timing_mode: TimingMode,
        frame_index: u64,
        slots: &'a mut OperationSlots,
        pending: &'a mut PendingChanges,
        pools: &'a mut SchedOpsPool,
    ) -> Self {
        Self {
            game_time,
            frame_time,
            timing_mode,
            frame_index,
            slots,
            pending,
            pools,
        }
    }

    /// Current game time
    pub fn game_time(&self) -> i64 {
        self.game_time
    }

    /// Time elapsed since the previous frame
    pub fn frame_time(&self) -> i64 {
        self.frame_time
    }

    /// Unit of game time and frame time
    pub fn timing_mode(&self) -> TimingMode {
        self.timing_mode
    }

    /// Frame time in milliseconds
    pub fn frame_millis(&self) -> f64 {
        self.timing_mode.to_millis(self.frame_time)
    }

    /// Number of frames the scheduler completed before this one
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Register an operation; it is first updated on the next frame
    pub fn schedule<O: ScheduledOperation + 'static>(&mut self, operation: O) -> OperationId {
        self.schedule_boxed(Box::new(operation))
    }

    /// Register a boxed operation; it is first updated on the next frame
    pub fn schedule_boxed(&mut self, operation: Box<dyn ScheduledOperation>) -> OperationId {
        log::trace!("Deferred scheduling of {}", operation.name());
        let id = self.slots.insert(Some(operation));
        self.pending.added.push(id);
        id
    }

    /// Unregister an operation once the current pass completes
    pub fn unschedule(&mut self, id: OperationId) {
        self.pending.removed.push(id);
    }

    /// Kill another operation right away
    ///
    /// Returns `false` for unknown ids and for the operation currently being updated.
    pub fn kill(&mut self, id: OperationId) -> bool {
        match self.slots.get_mut(id) {
            Some(Some(operation)) => {
                operation.kill();
                true
            }
            _ => false,
        }
    }

    /// Object pools owned by the scheduler
    pub fn pools(&mut self) -> &mut SchedOpsPool {
        &mut *self.pools
    }
}
