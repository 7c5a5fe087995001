//! One-shot ray picking against the scene graph

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::{Point3, Vec3};
use crate::pool::{Poolable, SchedOpsPool};
use crate::scene::{NodeHandle, PickResult, SceneGraph};
use crate::scheduler::{FrameContext, OperationError, OperationState, ScheduledOperation};

type PickListener = Box<dyn FnMut(&[PickResult])>;

/// Pooled request to cast a ray on the next frame
///
/// The listener receives every hit shape sorted by distance, possibly none.
pub struct ScheduledPicker {
    state: OperationState,
    scene: Option<Rc<RefCell<SceneGraph>>>,
    root: Option<NodeHandle>,
    origin: Point3,
    direction: Vec3,
    listener: Option<PickListener>,
    results: Vec<PickResult>,
}

impl Default for ScheduledPicker {
    fn default() -> Self {
        Self {
            state: OperationState::one_shot(),
            scene: None,
            root: None,
            origin: Point3::origin(),
            direction: -Vec3::z(),
            listener: None,
            results: Vec::new(),
        }
    }
}

impl ScheduledPicker {
    /// Cast from `origin` along `direction` through `scene`
    pub fn configure<F>(
        &mut self,
        scene: Rc<RefCell<SceneGraph>>,
        origin: Point3,
        direction: Vec3,
        listener: F,
    ) -> &mut Self
    where
        F: FnMut(&[PickResult]) + 'static,
    {
        self.scene = Some(scene);
        self.origin = origin;
        self.direction = direction;
        self.listener = Some(Box::new(listener));
        self
    }

    /// Only pick shapes under `root` instead of the whole scene
    pub fn set_root(&mut self, root: NodeHandle) -> &mut Self {
        self.root = Some(root);
        self
    }

    /// Ray origin
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Ray direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    fn pick(&mut self) -> Result<(), OperationError> {
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| OperationError::InvalidConfiguration("picker has no scene".to_string()))?;
        {
            let scene = scene.borrow();
            let root = self.root.unwrap_or_else(|| scene.root());
            scene.pick(root, self.origin, self.direction, &mut self.results)?;
        }
        log::trace!("Pick ray hit {} shapes", self.results.len());
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.results);
        }
        Ok(())
    }
}

impl ScheduledOperation for ScheduledPicker {
    fn update(&mut self, _frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        self.state.set_alive(false);
        self.pick()
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

    fn is_pooled(&self) -> bool {
        true
    }

    fn recycle(self: Box<Self>, pools: &mut SchedOpsPool) {
        pools.deallocate_picker(*self);
    }
}

impl Poolable for ScheduledPicker {
    fn reset(&mut self) {
        self.state = OperationState::one_shot();
        self.scene = None;
        self.root = None;
        self.listener = None;
        self.results.clear();
    }
}
