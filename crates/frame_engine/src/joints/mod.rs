//! Joint constraints
//!
//! Every joint exposes its kind and the two bodies it connects through the
//! [`Joint`] trait. The owned transform of a joint is a pure function of its
//! parameters and is recomputed by each setter before it returns.

use std::fmt;

use thiserror::Error;

use crate::scene::{NodeHandle, SceneError};

pub mod ball;
pub mod limit_motor;
pub mod slider;
pub mod hinge;
pub mod targets;

pub use ball::BallJoint;
pub use limit_motor::JointLimitMotor;
pub use slider::{KinematicSliderBackend, SliderBackend, SliderJoint};
pub use hinge::HingeJoint;
pub use targets::{HingeAngleTarget, HingeLengthTarget};

/// Joint kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    /// Shared point, no rotational constraint
    Ball,
    /// Translation along a single axis
    Slider,
    /// Rotation about an axis plus a fixed-direction extension
    Hinge,
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JointType::Ball => "Ball",
            JointType::Slider => "Slider",
            JointType::Hinge => "Hinge",
        };
        f.write_str(name)
    }
}

/// Identifier of a rigid body owned by an external physics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub u32);

/// One side of a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointBody {
    /// Physics rigid body
    Rigid(BodyId),
    /// Scene graph transform node
    Node(NodeHandle),
}

/// Common joint interface
pub trait Joint {
    /// Constant per joint kind
    fn joint_type(&self) -> JointType;

    /// Diagnostic description
    fn info(&self) -> Option<String> {
        None
    }

    /// First connected body
    fn body1(&self) -> Option<JointBody>;

    /// Second connected body
    fn body2(&self) -> Option<JointBody>;
}

/// Joint configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JointError {
    /// An axis vector has (near) zero length
    #[error("Joint axis '{name}' has zero length")]
    DegenerateAxis {
        /// Which axis was rejected
        name: &'static str,
    },

    /// Lower limit above upper limit, or a non-finite limit
    #[error("Invalid joint limits: min {min} max {max}")]
    InvalidLimits {
        /// Lower limit
        min: f32,
        /// Upper limit
        max: f32,
    },

    /// The physics backend refused the request
    #[error("Physics backend error: {0}")]
    Backend(String),

    /// A joint node could not be updated
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_type_names() {
        assert_eq!(JointType::Ball.to_string(), "Ball");
        assert_eq!(JointType::Slider.to_string(), "Slider");
        assert_eq!(JointType::Hinge.to_string(), "Hinge");
    }
}
