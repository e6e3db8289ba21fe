//! Entity transform
//!
//! Rotation is stored as Euler angles in radians, applied in the intrinsic
//! XYZ order. For entities with a physics body, position and rotation are
//! overwritten from the body every variable tick.

use crate::foundation::math::{euler_from_quaternion, quaternion_from_euler, Mat4, Quat, Vec3};

/// Position, Euler rotation and scale of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Euler angles in radians (XYZ order)
    pub rotation: Vec3,

    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set rotation from Euler angles (radians, XYZ order)
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation as a quaternion
    pub fn orientation(&self) -> Quat {
        quaternion_from_euler(self.rotation)
    }

    /// Set rotation from a quaternion
    pub fn set_orientation(&mut self, orientation: &Quat) {
        self.rotation = euler_from_quaternion(orientation);
    }

    /// Convert to transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.orientation().to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}
