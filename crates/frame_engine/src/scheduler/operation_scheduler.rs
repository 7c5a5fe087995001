//! Per-frame operation dispatcher
//!
//! Holds every registered [`ScheduledOperation`] and advances them once per
//! frame in registration order. Dead one-shot operations are unregistered and
//! recycled into the scheduler's [`SchedOpsPool`].

use slotmap::new_key_type;

use crate::core::PoolConfig;
use crate::foundation::time::TimingMode;
use crate::pool::SchedOpsPool;
use crate::scheduler::context::{OperationSlots, PendingChanges};
use crate::scheduler::{FrameContext, OperationFlags, ScheduledOperation};

new_key_type! {
    /// Generation-checked handle of a registered operation
    pub struct OperationId;
}

/// Snapshot of one registered operation, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationInfo {
    /// Handle of the operation
    pub id: OperationId,
    /// Type name of the operation
    pub name: &'static str,
    /// Scheduling state
    pub flags: OperationFlags,
}

/// Single-threaded per-frame scheduler
pub struct OperationScheduler {
    slots: OperationSlots,
    order: Vec<OperationId>,
    snapshot: Vec<OperationId>,
    pending: PendingChanges,
    pools: SchedOpsPool,
    frame_count: u64,
}

impl Default for OperationScheduler {
    fn default() -> Self {
        Self::new(SchedOpsPool::new(&PoolConfig::default()))
    }
}

impl OperationScheduler {
    /// Create a scheduler owning the given pools
    pub fn new(pools: SchedOpsPool) -> Self {
        Self {
            slots: OperationSlots::with_key(),
            order: Vec::new(),
            snapshot: Vec::new(),
            pending: PendingChanges::default(),
            pools,
            frame_count: 0,
        }
    }

    /// Register an operation for per-frame updates
    pub fn schedule_operation<O: ScheduledOperation + 'static>(&mut self, operation: O) -> OperationId {
        self.schedule_boxed(Box::new(operation))
    }

    /// Register a boxed operation for per-frame updates
    pub fn schedule_boxed(&mut self, operation: Box<dyn ScheduledOperation>) -> OperationId {
        log::debug!("Scheduling {}", operation.name());
        let id = self.slots.insert(Some(operation));
        self.order.push(id);
        id
    }

    /// Unregister an operation, recycling it if it is pool-eligible
    ///
    /// Returns `false` if the id is stale.
    pub fn unschedule_operation(&mut self, id: OperationId) -> bool {
        match self.slots.remove(id) {
            Some(Some(operation)) => {
                self.order.retain(|other| *other != id);
                log::debug!("Unscheduling {}", operation.name());
                operation.recycle(&mut self.pools);
                true
            }
            _ => false,
        }
    }

    /// Kill an operation; non-persistent ones are removed on the next update
    pub fn kill(&mut self, id: OperationId) -> bool {
        self.with_operation(id, |operation| operation.kill())
    }

    /// Bring a dormant persistent operation back to life
    pub fn revive(&mut self, id: OperationId) -> bool {
        self.with_operation(id, |operation| operation.set_alive(true))
    }

    /// Whether the operation is alive, or `None` for stale ids
    pub fn is_alive(&self, id: OperationId) -> Option<bool> {
        match self.slots.get(id) {
            Some(Some(operation)) => Some(operation.is_alive()),
            _ => None,
        }
    }

    /// Whether the id refers to a registered operation
    pub fn contains(&self, id: OperationId) -> bool {
        self.slots.contains_key(id)
    }

    /// Number of registered operations
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no operation is registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of completed update passes
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Object pools owned by this scheduler
    pub fn pools(&self) -> &SchedOpsPool {
        &self.pools
    }

    /// Mutable access to the object pools, e.g. to allocate a screenshot request
    pub fn pools_mut(&mut self) -> &mut SchedOpsPool {
        &mut self.pools
    }

    /// Diagnostic snapshot of all operations in registration order
    pub fn operation_infos(&self) -> Vec<OperationInfo> {
        self.order
            .iter()
            .filter_map(|&id| match self.slots.get(id) {
                Some(Some(operation)) => Some(OperationInfo {
                    id,
                    name: operation.name(),
                    flags: operation.flags(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Unregister and recycle every operation
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.order) {
            if let Some(Some(operation)) = self.slots.remove(id) {
                operation.recycle(&mut self.pools);
            }
        }
        self.slots.clear();
    }

    /// Advance every live operation by one frame
    ///
    /// Operations run in registration order. Each one that is dead after its
    /// update (and is not persistent) is removed and recycled; one that fails
    /// is logged and removed without stopping the rest of the frame.
    pub fn update(&mut self, game_time: i64, frame_time: i64, timing_mode: TimingMode) {
        let mut snapshot = std::mem::take(&mut self.snapshot);
        snapshot.clear();
        snapshot.extend_from_slice(&self.order);

        let mut removed_any = false;
        for &id in &snapshot {
            let Some(mut operation) = self.slots.get_mut(id).and_then(Option::take) else {
                continue;
            };

            let result = if operation.is_alive() {
                let mut frame = FrameContext::new(
                    game_time,
                    frame_time,
                    timing_mode,
                    self.frame_count,
                    &mut self.slots,
                    &mut self.pending,
                    &mut self.pools,
                );
                operation.update(&mut frame)
            } else {
                Ok(())
            };

            match result {
                Err(err) => {
                    log::error!("Operation {} failed and was removed: {}", operation.name(), err);
                    self.slots.remove(id);
                    operation.recycle(&mut self.pools);
                    removed_any = true;
                }
                Ok(()) if !operation.is_alive() && !operation.is_persistent() => {
                    log::trace!("Operation {} finished", operation.name());
                    self.slots.remove(id);
                    operation.recycle(&mut self.pools);
                    removed_any = true;
                }
                Ok(()) => {
                    if let Some(slot) = self.slots.get_mut(id) {
                        *slot = Some(operation);
                    }
                }
            }
        }
        self.snapshot = snapshot;

        for id in std::mem::take(&mut self.pending.removed) {
            if let Some(Some(operation)) = self.slots.remove(id) {
                log::debug!("Unscheduling {}", operation.name());
                operation.recycle(&mut self.pools);
                removed_any = true;
            }
        }
        if removed_any {
            let slots = &self.slots;
            self.order.retain(|id| slots.contains_key(*id));
        }
        for id in self.pending.added.drain(..) {
            if self.slots.contains_key(id) {
                self.order.push(id);
            }
        }

        self.frame_count += 1;
    }

    fn with_operation(&mut self, id: OperationId, f: impl FnOnce(&mut dyn ScheduledOperation)) -> bool {
        match self.slots.get_mut(id) {
            Some(Some(operation)) => {
                f(operation.as_mut());
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for OperationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationScheduler")
            .field("operations", &self.slots.len())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{OperationError, OperationState};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Records its label each frame and dies after `lifetime` updates
    struct Recorder {
        state: OperationState,
        label: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        remaining: Option<u32>,
    }

    impl Recorder {
        fn new(label: &'static str, log: &Rc<RefCell<Vec<&'static str>>>, remaining: Option<u32>) -> Self {
            Self {
                state: OperationState::new(remaining.is_none()),
                label,
                log: Rc::clone(log),
                remaining,
            }
        }
    }

    impl ScheduledOperation for Recorder {
        fn update(&mut self, _frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
            self.log.borrow_mut().push(self.label);
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
                if *remaining == 0 {
                    self.state.set_alive(false);
                }
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

    struct Failing;

    impl ScheduledOperation for Failing {
        fn update(&mut self, _frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
            Err(OperationError::Custom("boom".to_string()))
        }

        fn is_alive(&self) -> bool {
            true
        }

        fn set_alive(&mut self, _alive: bool) {}

        fn is_persistent(&self) -> bool {
            true
        }
    }

    /// Schedules a child recorder on its first update, then dies
    struct Spawner {
        state: OperationState,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ScheduledOperation for Spawner {
        fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
            self.log.borrow_mut().push("spawner");
            frame.schedule(Recorder::new("child", &self.log, Some(1)));
            self.state.set_alive(false);
            Ok(())
        }

        fn is_alive(&self) -> bool {
            self.state.is_alive()
        }

        fn set_alive(&mut self, alive: bool) {
            self.state.set_alive(alive);
        }

        fn is_persistent(&self) -> bool {
            false
        }
    }

    /// On its first update, unschedules one operation and kills another
    struct Gatekeeper {
        log: Rc<RefCell<Vec<&'static str>>>,
        own: Rc<Cell<Option<OperationId>>>,
        evict: Rc<Cell<Option<OperationId>>>,
        stop: Rc<Cell<Option<OperationId>>>,
        outcomes: Rc<RefCell<Vec<bool>>>,
    }

    impl ScheduledOperation for Gatekeeper {
        fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
            self.log.borrow_mut().push("gatekeeper");
            if let Some(evict) = self.evict.take() {
                frame.unschedule(evict);
            }
            if let Some(stop) = self.stop.take() {
                self.outcomes.borrow_mut().push(frame.kill(stop));
            }
            if let Some(own) = self.own.take() {
                self.outcomes.borrow_mut().push(frame.kill(own));
            }
            Ok(())
        }

        fn is_alive(&self) -> bool {
            true
        }

        fn set_alive(&mut self, _alive: bool) {}

        fn is_persistent(&self) -> bool {
            true
        }
    }

    fn tick(scheduler: &mut OperationScheduler, game_time: i64) {
        scheduler.update(game_time, 16, TimingMode::Milliseconds);
    }

    #[test]
    fn test_updates_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(Recorder::new("a", &log, None));
        scheduler.schedule_operation(Recorder::new("b", &log, None));
        scheduler.schedule_operation(Recorder::new("c", &log, None));

        tick(&mut scheduler, 0);
        tick(&mut scheduler, 16);

        assert_eq!(*log.borrow(), vec!["a", "b", "c", "a", "b", "c"]);
        assert_eq!(scheduler.frame_count(), 2);
    }

    #[test]
    fn test_one_shots_removed_persistent_retained() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = OperationScheduler::default();
        for _ in 0..3 {
            scheduler.schedule_operation(Recorder::new("persistent", &log, None));
        }
        for lifetime in 1..=4 {
            scheduler.schedule_operation(Recorder::new("one-shot", &log, Some(lifetime)));
        }
        assert_eq!(scheduler.len(), 7);

        let mut previous = scheduler.len();
        for frame in 0..6 {
            tick(&mut scheduler, frame * 16);
            assert!(scheduler.len() <= previous);
            previous = scheduler.len();
        }
        assert_eq!(scheduler.len(), 3);
    }

    #[test]
    fn test_failing_operation_is_isolated() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(Recorder::new("before", &log, None));
        let failing = scheduler.schedule_operation(Failing);
        scheduler.schedule_operation(Recorder::new("after", &log, None));

        tick(&mut scheduler, 0);

        assert!(!scheduler.contains(failing));
        assert_eq!(scheduler.len(), 2);
        assert_eq!(*log.borrow(), vec!["before", "after"]);
    }

    #[test]
    fn test_operations_scheduled_mid_frame_run_next_frame() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(Spawner {
            state: OperationState::one_shot(),
            log: Rc::clone(&log),
        });
        scheduler.schedule_operation(Recorder::new("tail", &log, Some(2)));

        tick(&mut scheduler, 0);
        assert_eq!(*log.borrow(), vec!["spawner", "tail"]);
        assert_eq!(scheduler.len(), 2);

        tick(&mut scheduler, 16);
        assert_eq!(*log.borrow(), vec!["spawner", "tail", "tail", "child"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_persistent_kill_and_revive() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = OperationScheduler::default();
        let id = scheduler.schedule_operation(Recorder::new("p", &log, None));

        assert!(scheduler.kill(id));
        tick(&mut scheduler, 0);
        assert!(scheduler.contains(id));
        assert_eq!(scheduler.is_alive(id), Some(false));
        assert!(log.borrow().is_empty());

        assert!(scheduler.revive(id));
        tick(&mut scheduler, 16);
        assert_eq!(*log.borrow(), vec!["p"]);

        assert!(scheduler.unschedule_operation(id));
        assert!(!scheduler.unschedule_operation(id));
        assert_eq!(scheduler.is_alive(id), None);
    }

    #[test]
    fn test_operation_infos_report_flags() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(Recorder::new("p", &log, None));
        scheduler.schedule_operation(Recorder::new("o", &log, Some(1)));

        let infos = scheduler.operation_infos();
        assert_eq!(infos.len(), 2);
        assert!(infos[0].flags.contains(OperationFlags::ALIVE | OperationFlags::PERSISTENT));
        assert!(!infos[1].flags.contains(OperationFlags::PERSISTENT));

        scheduler.clear();
        assert!(scheduler.is_empty());
        assert!(scheduler.operation_infos().is_empty());
    }

    #[test]
    fn test_mid_pass_unschedule_is_deferred_and_kill_is_immediate() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let own = Rc::new(Cell::new(None));
        let evict = Rc::new(Cell::new(None));
        let stop = Rc::new(Cell::new(None));
        let outcomes = Rc::new(RefCell::new(Vec::new()));

        let mut scheduler = OperationScheduler::default();
        let gatekeeper = scheduler.schedule_operation(Gatekeeper {
            log: Rc::clone(&log),
            own: Rc::clone(&own),
            evict: Rc::clone(&evict),
            stop: Rc::clone(&stop),
            outcomes: Rc::clone(&outcomes),
        });
        let evicted = scheduler.schedule_operation(Recorder::new("evicted", &log, None));
        let stopped = scheduler.schedule_operation(Recorder::new("stopped", &log, None));
        own.set(Some(gatekeeper));
        evict.set(Some(evicted));
        stop.set(Some(stopped));

        tick(&mut scheduler, 0);
        // The evicted operation still runs this pass; the stopped one does not
        assert_eq!(*log.borrow(), vec!["gatekeeper", "evicted"]);
        assert_eq!(*outcomes.borrow(), vec![true, false]);
        assert!(!scheduler.contains(evicted));
        assert_eq!(scheduler.is_alive(stopped), Some(false));
        assert_eq!(scheduler.len(), 2);

        tick(&mut scheduler, 16);
        assert_eq!(*log.borrow(), vec!["gatekeeper", "evicted", "gatekeeper"]);
        assert_eq!(scheduler.is_alive(gatekeeper), Some(true));
    }
}
