//! Interpolation targets driving hinge parameters

use std::cell::RefCell;
use std::rc::Rc;

use crate::joints::HingeJoint;
use crate::scene::SceneGraph;
use crate::scheduler::{InterpolationTarget, OperationError};

/// Drives a hinge's angle, in radians
#[derive(Debug, Clone)]
pub struct HingeAngleTarget {
    joint: Rc<RefCell<HingeJoint>>,
    graph: Rc<RefCell<SceneGraph>>,
}

impl HingeAngleTarget {
    /// Drive `joint`, whose nodes live in `graph`
    pub fn new(joint: Rc<RefCell<HingeJoint>>, graph: Rc<RefCell<SceneGraph>>) -> Self {
        Self { joint, graph }
    }
}

impl InterpolationTarget for HingeAngleTarget {
    fn apply_value(&mut self, value: f32) -> Result<(), OperationError> {
        let mut graph = self.graph.borrow_mut();
        self.joint.borrow_mut().set_angle(&mut graph, value)?;
        Ok(())
    }
}

/// Drives a hinge's length
#[derive(Debug, Clone)]
pub struct HingeLengthTarget {
    joint: Rc<RefCell<HingeJoint>>,
    graph: Rc<RefCell<SceneGraph>>,
}

impl HingeLengthTarget {
    /// Drive `joint`, whose nodes live in `graph`
    pub fn new(joint: Rc<RefCell<HingeJoint>>, graph: Rc<RefCell<SceneGraph>>) -> Self {
        Self { joint, graph }
    }
}

impl InterpolationTarget for HingeLengthTarget {
    fn apply_value(&mut self, value: f32) -> Result<(), OperationError> {
        let mut graph = self.graph.borrow_mut();
        self.joint.borrow_mut().set_length(&mut graph, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use crate::foundation::time::TimingMode;
    use crate::scheduler::{OperationScheduler, ValueInterpolator};
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolators_swing_and_extend_hinge() {
        let graph = Rc::new(RefCell::new(SceneGraph::new()));
        let hinge = {
            let mut g = graph.borrow_mut();
            HingeJoint::new(&mut g, Vec3::z(), Vec3::x(), 1.0, 0.0).unwrap()
        };
        let hinge = Rc::new(RefCell::new(hinge));

        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(ValueInterpolator::new(
            100,
            0.0,
            1.0,
            HingeAngleTarget::new(Rc::clone(&hinge), Rc::clone(&graph)),
        ));
        scheduler.schedule_operation(ValueInterpolator::new(
            100,
            1.0,
            3.0,
            HingeLengthTarget::new(Rc::clone(&hinge), Rc::clone(&graph)),
        ));

        scheduler.update(0, 0, TimingMode::Milliseconds);
        scheduler.update(50, 50, TimingMode::Milliseconds);
        assert_relative_eq!(hinge.borrow().angle(), 0.5, epsilon = 1e-6);
        assert_relative_eq!(hinge.borrow().length(), 2.0, epsilon = 1e-6);

        scheduler.update(100, 50, TimingMode::Milliseconds);
        assert!(scheduler.is_empty());
        assert_eq!(hinge.borrow().angle(), 1.0);

        let translation = graph
            .borrow()
            .transform(hinge.borrow().translation_transform_group())
            .unwrap();
        assert_relative_eq!(translation.translation_part(), Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-6);
    }
}
