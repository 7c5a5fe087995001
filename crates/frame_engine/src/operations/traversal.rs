//! One-shot scene graph traversal

use std::cell::RefCell;
use std::rc::Rc;

use crate::pool::NodeList;
use crate::scene::{NodeHandle, SceneGraph};
use crate::scheduler::{FrameContext, OperationError, OperationState, ScheduledOperation};

/// Collects the nodes under `root` on the next frame and hands them to a visitor
///
/// The node list is borrowed from the scheduler's pool and returned as soon
/// as the visitor is done with it.
pub struct ScheduledTraversal<F> {
    state: OperationState,
    scene: Rc<RefCell<SceneGraph>>,
    root: NodeHandle,
    visitor: F,
}

impl<F> ScheduledTraversal<F> {
    /// Visit the nodes under `root` on the next frame
    pub fn new(scene: Rc<RefCell<SceneGraph>>, root: NodeHandle, visitor: F) -> Self
    where
        F: FnMut(&SceneGraph, &NodeList) -> Result<(), OperationError>,
    {
        Self {
            state: OperationState::one_shot(),
            scene,
            root,
            visitor,
        }
    }
}

impl<F> ScheduledOperation for ScheduledTraversal<F>
where
    F: FnMut(&SceneGraph, &NodeList) -> Result<(), OperationError>,
{
    fn update(&mut self, frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        self.state.set_alive(false);

        let mut nodes = frame.pools().allocate_node_list();
        let scene = self.scene.borrow();
        let result = match scene.collect_into(self.root, &mut nodes) {
            Ok(()) => (self.visitor)(&*scene, &nodes),
            Err(err) => Err(err.into()),
        };
        frame.pools().deallocate_node_list(nodes);
        result
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::time::TimingMode;
    use crate::foundation::math::Vec3;
    use crate::scene::{NodeKind, AABB};
    use crate::scheduler::OperationScheduler;

    #[test]
    fn test_visitor_sees_subtree_and_list_returns_to_pool() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let shape = graph.create_shape(AABB::new(Vec3::zeros(), Vec3::repeat(1.0)));
        graph.add_child(graph.root(), group).unwrap();
        graph.add_child(group, shape).unwrap();
        let scene = Rc::new(RefCell::new(graph));

        let shapes = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&shapes);
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(ScheduledTraversal::new(Rc::clone(&scene), group, move |scene, nodes| {
            assert_eq!(nodes.as_slice(), &[group, shape]);
            *counter.borrow_mut() += nodes
                .iter()
                .filter(|&&node| matches!(scene.node(node).map(|n| n.kind()), Some(NodeKind::Shape(_))))
                .count();
            Ok(())
        }));

        scheduler.update(0, 0, TimingMode::Milliseconds);
        assert_eq!(*shapes.borrow(), 1);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.pools().node_lists().available(), 1);
    }

    #[test]
    fn test_stale_root_fails_without_leaking_list() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        graph.remove_node(group).unwrap();
        let scene = Rc::new(RefCell::new(graph));

        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(ScheduledTraversal::new(scene, group, |_, _| Ok(())));
        scheduler.update(0, 0, TimingMode::Milliseconds);

        assert!(scheduler.is_empty());
        assert_eq!(scheduler.pools().node_lists().outstanding(), 0);
    }
}
