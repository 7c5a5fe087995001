//! Pools owned by the operation scheduler

use crate::core::PoolConfig;
use crate::operations::{ScheduledPicker, ScheduledScreenshot, ScreenshotWorkers};
use crate::pool::{ByteBufferPool, NodeList, ObjectPool};

/// Every pool the scheduler hands out objects from
///
/// Owned by [`crate::scheduler::OperationScheduler`] and reachable from
/// operations through [`crate::scheduler::FrameContext::pools`].
#[derive(Debug)]
pub struct SchedOpsPool {
    screenshots: ObjectPool<ScheduledScreenshot>,
    pickers: ObjectPool<ScheduledPicker>,
    node_lists: ObjectPool<NodeList>,
    byte_buffers: ByteBufferPool,
    screenshot_workers: ScreenshotWorkers,
}

impl SchedOpsPool {
    /// Create empty pools sized from `config`
    pub fn new(config: &PoolConfig) -> Self {
        let byte_buffers = ByteBufferPool::new(config.leak_threshold);
        let screenshot_workers = ScreenshotWorkers::default();
        let screenshot_buffers = byte_buffers.clone();
        let workers = screenshot_workers.clone();

        Self {
            screenshots: ObjectPool::new("ScheduledScreenshot", config.screenshot_capacity, move || {
                ScheduledScreenshot::new(screenshot_buffers.clone(), workers.clone())
            })
            .with_leak_threshold(config.leak_threshold),
            pickers: ObjectPool::with_default("ScheduledPicker", config.picker_capacity)
                .with_leak_threshold(config.leak_threshold),
            node_lists: ObjectPool::with_default("NodeList", config.node_list_capacity)
                .with_leak_threshold(config.leak_threshold),
            byte_buffers,
            screenshot_workers,
        }
    }

    /// Take a screenshot request from the pool
    pub fn allocate_screenshot(&mut self) -> ScheduledScreenshot {
        self.screenshots.allocate()
    }

    /// Return a screenshot request
    pub fn deallocate_screenshot(&mut self, screenshot: ScheduledScreenshot) {
        self.screenshots.deallocate(screenshot);
    }

    /// Take a picker from the pool
    pub fn allocate_picker(&mut self) -> ScheduledPicker {
        self.pickers.allocate()
    }

    /// Return a picker
    pub fn deallocate_picker(&mut self, picker: ScheduledPicker) {
        self.pickers.deallocate(picker);
    }

    /// Take an empty node list from the pool
    pub fn allocate_node_list(&mut self) -> NodeList {
        self.node_lists.allocate()
    }

    /// Return a node list
    pub fn deallocate_node_list(&mut self, list: NodeList) {
        self.node_lists.deallocate(list);
    }

    /// Shared byte buffer pool
    pub fn byte_buffers(&self) -> &ByteBufferPool {
        &self.byte_buffers
    }

    /// Background screenshot threads spawned by this pool's requests
    pub fn screenshot_workers(&self) -> &ScreenshotWorkers {
        &self.screenshot_workers
    }

    /// Wait for every background screenshot to be written
    pub fn join_screenshot_workers(&self) -> usize {
        self.screenshot_workers.join_all()
    }

    /// Screenshot pool statistics
    pub fn screenshots(&self) -> &ObjectPool<ScheduledScreenshot> {
        &self.screenshots
    }

    /// Picker pool statistics
    pub fn pickers(&self) -> &ObjectPool<ScheduledPicker> {
        &self.pickers
    }

    /// Node list pool statistics
    pub fn node_lists(&self) -> &ObjectPool<NodeList> {
        &self.node_lists
    }
}

impl Default for SchedOpsPool {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}
