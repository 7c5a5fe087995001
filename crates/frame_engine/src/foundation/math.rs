//! Math utilities and types
//!
//! Provides the fundamental math types used by joints, focusers and the scene graph.

pub use nalgebra::{
    Vector3,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Squared length under which a direction vector is considered degenerate
pub const DEGENERATE_LENGTH_SQUARED: f32 = 1.0e-12;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

/// Math utility functions
pub mod utils {
    use super::{Point3, Vec3, DEGENERATE_LENGTH_SQUARED};

    /// Linear interpolation, exact at both `t = 0` and `t = 1`
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a * (1.0 - t) + b * t
    }

    /// Component-wise linear interpolation between two points
    pub fn lerp_point(a: &Point3, b: &Point3, t: f32) -> Point3 {
        Point3::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
    }

    /// Normalize a direction, returning `None` for (near) zero-length vectors
    pub fn try_normalize(v: &Vec3) -> Option<Vec3> {
        if v.norm_squared() <= DEGENERATE_LENGTH_SQUARED {
            None
        } else {
            Some(v.normalize())
        }
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Rotation matrix from a unit axis and an angle in radians
    fn axis_angle(axis: &Vec3, angle: f32) -> Mat4;

    /// Rotation matrix from Euler angles in radians (roll about X, pitch about Y, yaw about Z)
    fn euler(x: f32, y: f32, z: f32) -> Mat4;

    /// Embed a 3x3 rotation into a homogeneous matrix
    fn from_rotation(rotation: &Mat3) -> Mat4;

    /// Upper-left 3x3 block
    fn rotation_part(&self) -> Mat3;

    /// Translation column
    fn translation_part(&self) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn axis_angle(axis: &Vec3, angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Unit::new_normalize(*axis), angle)
    }

    fn euler(x: f32, y: f32, z: f32) -> Mat4 {
        Quat::from_euler_angles(x, y, z).to_homogeneous()
    }

    fn from_rotation(rotation: &Mat3) -> Mat4 {
        rotation.to_homogeneous()
    }

    fn rotation_part(&self) -> Mat3 {
        self.fixed_view::<3, 3>(0, 0).into_owned()
    }

    fn translation_part(&self) -> Vec3 {
        Vec3::new(self.m14, self.m24, self.m34)
    }
}
