//! Slider joint
//!
//! The slider's transform places body2 relative to body1:
//! `translation(offset + axis * position) * initial_rotation`.
//! Enforcing the limit motor is left to a [`SliderBackend`].

use crate::foundation::math::{utils, Mat3, Mat4, Mat4Ext, Vec3};
use crate::joints::{Joint, JointBody, JointError, JointLimitMotor, JointType};

/// Physics hook receiving limit motor changes
pub trait SliderBackend {
    /// Apply or clear the limit motor in the physics engine
    fn set_limit_motor_impl(&mut self, limit_motor: Option<&JointLimitMotor>) -> Result<(), JointError>;
}

/// Backend for sliders with no physics engine behind them
///
/// Limits are only enforced through [`SliderJoint::set_position`].
#[derive(Debug, Clone, Default)]
pub struct KinematicSliderBackend {
    applied: Option<JointLimitMotor>,
}

impl KinematicSliderBackend {
    /// Last limit motor handed to the backend
    pub fn applied(&self) -> Option<&JointLimitMotor> {
        self.applied.as_ref()
    }
}

impl SliderBackend for KinematicSliderBackend {
    fn set_limit_motor_impl(&mut self, limit_motor: Option<&JointLimitMotor>) -> Result<(), JointError> {
        self.applied = limit_motor.copied();
        Ok(())
    }
}

/// Joint allowing translation along one axis
#[derive(Debug, Clone)]
pub struct SliderJoint<B: SliderBackend = KinematicSliderBackend> {
    body1: Option<JointBody>,
    body2: Option<JointBody>,
    axis: Vec3,
    offset: Vec3,
    initial_rotation: Mat3,
    limit_motor: Option<JointLimitMotor>,
    position: f32,
    transform: Mat4,
    backend: B,
}

impl SliderJoint {
    /// Kinematic slider along +X
    pub fn new(body1: Option<JointBody>, body2: Option<JointBody>) -> Self {
        Self::with_backend(body1, body2, KinematicSliderBackend::default())
    }
}

impl<B: SliderBackend> SliderJoint<B> {
    /// Slider along +X delegating limits to `backend`
    pub fn with_backend(body1: Option<JointBody>, body2: Option<JointBody>, backend: B) -> Self {
        Self {
            body1,
            body2,
            axis: Vec3::x(),
            offset: Vec3::zeros(),
            initial_rotation: Mat3::identity(),
            limit_motor: None,
            position: 0.0,
            transform: Mat4::identity(),
            backend,
        }
    }

    fn recompute(&mut self) {
        let translation = Mat4::new_translation(&(self.offset + self.axis * self.position));
        self.transform = translation * Mat4::from_rotation(&self.initial_rotation);
    }

    /// Set the sliding direction; stored normalized
    pub fn set_axis(&mut self, axis: Vec3) -> Result<(), JointError> {
        self.axis = utils::try_normalize(&axis).ok_or(JointError::DegenerateAxis { name: "axis" })?;
        self.recompute();
        Ok(())
    }

    /// Set the translation applied before sliding
    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
        self.recompute();
    }

    /// Set the rotation of body2 relative to body1
    pub fn set_initial_rotation(&mut self, rotation: &Mat3) {
        self.initial_rotation = *rotation;
        self.recompute();
    }

    /// Set the initial rotation from Euler angles in radians
    pub fn set_initial_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.set_initial_rotation(&Mat4::euler(x, y, z).rotation_part());
    }

    /// Attach or clear the limit motor
    ///
    /// The backend sees the change first; if it fails the joint is unchanged.
    pub fn set_limit_motor(&mut self, limit_motor: Option<JointLimitMotor>) -> Result<(), JointError> {
        self.backend.set_limit_motor_impl(limit_motor.as_ref())?;
        self.limit_motor = limit_motor;
        if let Some(limits) = &self.limit_motor {
            self.position = limits.clamp(self.position);
        }
        self.recompute();
        Ok(())
    }

    /// Travel along the axis, clamped to the limit motor if any
    pub fn set_position(&mut self, position: f32) {
        self.position = match &self.limit_motor {
            Some(limits) => limits.clamp(position),
            None => position,
        };
        self.recompute();
    }

    /// Unit slide axis
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Offset of the slide origin
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Rotation applied before sliding
    pub fn initial_rotation(&self) -> &Mat3 {
        &self.initial_rotation
    }

    /// Active limits, if any
    pub fn limit_motor(&self) -> Option<&JointLimitMotor> {
        self.limit_motor.as_ref()
    }

    /// Current position along the axis
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Transform of body2 relative to body1
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// The physics hook
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SliderBackend> Joint for SliderJoint<B> {
    fn joint_type(&self) -> JointType {
        JointType::Slider
    }

    fn info(&self) -> Option<String> {
        Some(format!("position={:.3} motorized={}", self.position, self.limit_motor.is_some_and(|m| m.is_motorized())))
    }

    fn body1(&self) -> Option<JointBody> {
        self.body1
    }

    fn body2(&self) -> Option<JointBody> {
        self.body2
    }
}
