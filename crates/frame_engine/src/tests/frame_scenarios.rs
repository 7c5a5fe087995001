//! Frame scenarios mixing several operation kinds in one scheduler

use std::cell::{Cell, RefCell};
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use crate::camera::{BasicPlaceableVerticalFocuser, Camera, NodePlaceable};
use crate::foundation::math::{Mat4, Point3, Vec3};
use crate::foundation::time::TimingMode;
use crate::joints::{HingeAngleTarget, HingeJoint};
use crate::operations::ScheduledTraversal;
use crate::scene::{PickResult, SceneGraph, AABB};
use crate::scheduler::{FrameContext, Interval, IntervalControl, OperationScheduler, ValueInterpolator};
use crate::{Engine, EngineConfig};

fn counting_interval(resolution: i64, persistent: bool, hits: &Rc<Cell<u32>>) -> impl crate::scheduler::ScheduledOperation {
    let hits = Rc::clone(hits);
    Interval::from_fn(resolution, persistent, move |_frame| {
        hits.set(hits.get() + 1);
        Ok(IntervalControl::Continue)
    })
    .expect("non-negative resolution")
}

/// Two-segment arm in the XY plane: shoulder of length 2, elbow of length 1
fn build_arm(graph: &mut SceneGraph) -> (HingeJoint, HingeJoint) {
    let shoulder = HingeJoint::new(graph, Vec3::z(), Vec3::x(), 2.0, 0.0).unwrap();
    let elbow = HingeJoint::new(graph, Vec3::z(), Vec3::x(), 1.0, 0.0).unwrap();
    let root = graph.root();
    shoulder.attach_to(graph, root).unwrap();
    shoulder.add_child(graph, &elbow).unwrap();
    (shoulder, elbow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_persistent_operations_outlive_one_shots() {
        let mut scheduler = OperationScheduler::default();
        let hits = Rc::new(Cell::new(0));
        for _ in 0..3 {
            scheduler.schedule_operation(counting_interval(0, true, &hits));
        }
        let finished = Rc::new(Cell::new(0));
        for total_time in [100, 200, 300, 400] {
            let finished = Rc::clone(&finished);
            scheduler.schedule_operation(ValueInterpolator::new(total_time, 0.0, 1.0, move |value: f32| {
                if value >= 1.0 {
                    finished.set(finished.get() + 1);
                }
            }));
        }

        let mut previous = scheduler.len();
        assert_eq!(previous, 7);
        for frame in 0..=10 {
            scheduler.update(frame * 50, 50, TimingMode::Milliseconds);
            assert!(scheduler.len() <= previous);
            previous = scheduler.len();
        }

        assert_eq!(finished.get(), 4);
        assert_eq!(scheduler.len(), 3);
        assert_eq!(hits.get(), 3 * 11);
    }

    #[test]
    fn test_failing_operation_does_not_stop_the_frame() {
        let graph = Rc::new(RefCell::new(SceneGraph::new()));
        let (shoulder, _elbow) = build_arm(&mut graph.borrow_mut());
        let doomed = shoulder.rotation_transform_group();
        let shoulder = Rc::new(RefCell::new(shoulder));

        let mut scheduler = OperationScheduler::default();
        let hits = Rc::new(Cell::new(0));
        let sweep = scheduler.schedule_operation(ValueInterpolator::new(
            1000,
            0.0,
            FRAC_PI_2,
            HingeAngleTarget::new(Rc::clone(&shoulder), Rc::clone(&graph)),
        ));
        let counter = scheduler.schedule_operation(counting_interval(0, true, &hits));

        scheduler.update(0, 16, TimingMode::Milliseconds);
        assert!(scheduler.contains(sweep));

        // The arm disappears from under the running interpolator
        graph.borrow_mut().remove_node(doomed).unwrap();
        scheduler.update(16, 16, TimingMode::Milliseconds);

        assert!(!scheduler.contains(sweep));
        assert!(scheduler.contains(counter));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_camera_follows_animated_arm() {
        let graph = Rc::new(RefCell::new(SceneGraph::new()));
        let (shoulder, elbow) = build_arm(&mut graph.borrow_mut());
        let hand = NodePlaceable::new(Rc::clone(&graph), elbow.translation_transform_group());
        let shoulder = Rc::new(RefCell::new(shoulder));
        let camera = Rc::new(RefCell::new(Camera::default()));

        let mut scheduler = OperationScheduler::default();
        let sweep = scheduler.schedule_operation(ValueInterpolator::new(
            1000,
            0.0,
            FRAC_PI_2,
            HingeAngleTarget::new(Rc::clone(&shoulder), Rc::clone(&graph)),
        ));
        BasicPlaceableVerticalFocuser::attach(&mut scheduler, camera.clone(), Rc::new(hand), 10.0);

        scheduler.update(0, 16, TimingMode::Milliseconds);
        assert_relative_eq!(camera.borrow().eye, Point3::new(3.0, 0.0, 10.0), epsilon = 1e-5);

        scheduler.update(1000, 1000, TimingMode::Milliseconds);
        assert_relative_eq!(shoulder.borrow().angle(), FRAC_PI_2);
        assert_relative_eq!(camera.borrow().eye, Point3::new(0.0, 3.0, 10.0), epsilon = 1e-5);
        assert_relative_eq!(camera.borrow().target, Point3::new(0.0, 3.0, 0.0), epsilon = 1e-5);
        assert!(!scheduler.contains(sweep));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_interval_requests_recycled_pickers() {
        let graph = Rc::new(RefCell::new(SceneGraph::new()));
        {
            let mut graph = graph.borrow_mut();
            let root = graph.root();
            let offset = graph.create_transform_group(Mat4::new_translation(&Vec3::new(0.0, 0.0, -5.0)));
            let target = graph.create_shape(AABB::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)));
            graph.add_child(root, offset).unwrap();
            graph.add_child(offset, target).unwrap();
        }

        let distances = Rc::new(RefCell::new(Vec::new()));
        let scene = Rc::clone(&graph);
        let sink = Rc::clone(&distances);
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(
            Interval::from_fn(100, true, move |frame: &mut FrameContext<'_>| {
                let sink = Rc::clone(&sink);
                let mut picker = frame.pools().allocate_picker();
                picker.configure(Rc::clone(&scene), Point3::origin(), -Vec3::z(), move |hits: &[PickResult]| {
                    sink.borrow_mut().extend(hits.iter().map(|hit| hit.distance));
                });
                frame.schedule(picker);
                Ok(IntervalControl::Continue)
            })
            .unwrap(),
        );

        for frame in 0..10 {
            scheduler.update(frame * 50, 50, TimingMode::Milliseconds);
        }

        // Requests at 0, 100, ..., 400 are each picked one frame later
        let distances = distances.borrow();
        assert_eq!(distances.len(), 5);
        for distance in distances.iter() {
            assert_relative_eq!(*distance, 4.0, epsilon = 1e-5);
        }
        assert_eq!(scheduler.pools().pickers().created(), 1);
        assert_eq!(scheduler.pools().pickers().available(), 1);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_traversals_share_one_node_list() {
        let graph = Rc::new(RefCell::new(SceneGraph::new()));
        let (shoulder, _elbow) = build_arm(&mut graph.borrow_mut());
        let counts = Rc::new(RefCell::new(Vec::new()));

        let mut engine = Engine::new(EngineConfig::default().with_performance_monitor(false)).unwrap();
        for _ in 0..2 {
            let counts = Rc::clone(&counts);
            engine.scheduler_mut().schedule_operation(ScheduledTraversal::new(
                Rc::clone(&graph),
                shoulder.rotation_transform_group(),
                move |_scene: &SceneGraph, nodes: &crate::pool::NodeList| {
                    counts.borrow_mut().push(nodes.len());
                    Ok(())
                },
            ));
        }
        engine.advance(16);

        assert_eq!(*counts.borrow(), vec![4, 4]);
        assert!(engine.scheduler().is_empty());
        let node_lists = engine.scheduler().pools().node_lists();
        assert_eq!(node_lists.created(), 1);
        assert_eq!(node_lists.outstanding(), 0);
    }
}
