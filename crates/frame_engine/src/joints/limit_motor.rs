//! Travel limits and motor for sliding joints

use crate::joints::JointError;

/// Min/max travel plus an optional motor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimitMotor {
    min: f32,
    max: f32,
    velocity: f32,
    max_force: f32,
}

impl JointLimitMotor {
    /// Limits without a motor
    pub fn new(min: f32, max: f32) -> Result<Self, JointError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(JointError::InvalidLimits { min, max });
        }
        Ok(Self {
            min,
            max,
            velocity: 0.0,
            max_force: 0.0,
        })
    }

    /// Drive the joint at `velocity` with up to `max_force`
    pub fn with_motor(mut self, velocity: f32, max_force: f32) -> Self {
        self.velocity = velocity;
        self.max_force = max_force.max(0.0);
        self
    }

    /// Lower limit
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper limit
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Target motor velocity
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Largest force the motor may apply
    pub fn max_force(&self) -> f32 {
        self.max_force
    }

    /// Whether the motor applies any force
    pub fn is_motorized(&self) -> bool {
        self.max_force > 0.0
    }

    /// Clamp a travel value into the limits
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}
