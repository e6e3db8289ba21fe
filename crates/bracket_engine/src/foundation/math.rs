//! Math utilities and types
//!
//! Provides the vector and quaternion types shared by the registry, the
//! physics world and the transform bridge.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Build a quaternion from Euler angles (radians) using the intrinsic XYZ order.
///
/// The resulting rotation is `Rx(x) * Ry(y) * Rz(z)`, the same order the
/// bridge uses when it converts back with [`euler_from_quaternion`].
pub fn quaternion_from_euler(euler: Vec3) -> Quat {
    Quat::from_axis_angle(&Vec3::x_axis(), euler.x)
        * Quat::from_axis_angle(&Vec3::y_axis(), euler.y)
        * Quat::from_axis_angle(&Vec3::z_axis(), euler.z)
}

/// Convert a quaternion to Euler angles (radians) using the intrinsic XYZ order.
///
/// Near the gimbal-lock pole (|pitch| close to 90 degrees) the Z angle is
/// folded into X and reported as zero.
pub fn euler_from_quaternion(rotation: &Quat) -> Vec3 {
    let m = rotation.to_rotation_matrix();
    let m = m.matrix();

    let m11 = m[(0, 0)];
    let m12 = m[(0, 1)];
    let m13 = m[(0, 2)];
    let m22 = m[(1, 1)];
    let m23 = m[(1, 2)];
    let m32 = m[(2, 1)];
    let m33 = m[(2, 2)];

    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.999_999_9 {
        Vec3::new((-m23).atan2(m33), y, (-m12).atan2(m11))
    } else {
        Vec3::new(m32.atan2(m22), y, 0.0)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}
