//! Ball joint

use crate::foundation::math::Point3;
use crate::joints::{Joint, JointBody, JointType};

/// Two bodies sharing a point
///
/// Each anchor is expressed in its body's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BallJoint {
    body1: Option<JointBody>,
    body2: Option<JointBody>,
    anchor1: Point3,
    anchor2: Point3,
}

impl BallJoint {
    /// Connect two bodies with both anchors at their origins
    pub fn new(body1: Option<JointBody>, body2: Option<JointBody>) -> Self {
        Self {
            body1,
            body2,
            anchor1: Point3::origin(),
            anchor2: Point3::origin(),
        }
    }

    /// Set the anchor on the first body
    pub fn set_anchor1(&mut self, x: f32, y: f32, z: f32) {
        self.anchor1 = Point3::new(x, y, z);
    }

    /// Set the anchor on the second body
    pub fn set_anchor2(&mut self, x: f32, y: f32, z: f32) {
        self.anchor2 = Point3::new(x, y, z);
    }

    /// Anchor on the first body
    pub fn anchor1(&self) -> Point3 {
        self.anchor1
    }

    /// Anchor on the second body
    pub fn anchor2(&self) -> Point3 {
        self.anchor2
    }
}

impl Joint for BallJoint {
    fn joint_type(&self) -> JointType {
        JointType::Ball
    }

    fn info(&self) -> Option<String> {
        Some(format!(
            "anchor1=({:.3}, {:.3}, {:.3}) anchor2=({:.3}, {:.3}, {:.3})",
            self.anchor1.x, self.anchor1.y, self.anchor1.z,
            self.anchor2.x, self.anchor2.y, self.anchor2.z,
        ))
    }

    fn body1(&self) -> Option<JointBody> {
        self.body1
    }

    fn body2(&self) -> Option<JointBody> {
        self.body2
    }
}
