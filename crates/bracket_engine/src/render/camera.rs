//! # 3D Camera
//!
//! Perspective camera owned by the engine. Scripts move it through their
//! context; the engine refreshes its aspect ratio from the viewport before a
//! frame snapshot is submitted.
//!
//! ## Conventions
//! Right-handed, Y up. With the identity orientation the camera looks down
//! -Z, with +X to its right.

use nalgebra::{Isometry3, Perspective3, Translation3};

use crate::foundation::math::{utils, Mat4, Quat, Vec3};

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Camera orientation in world space
    pub orientation: Quat,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera looking down -Z
    ///
    /// # Example
    /// ```
    /// use bracket_engine::foundation::math::Vec3;
    /// use bracket_engine::render::Camera;
    ///
    /// let camera = Camera::perspective(Vec3::new(0.0, 2.0, 5.0), 75.0, 16.0 / 9.0, 0.1, 1000.0);
    /// assert!((camera.forward() - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    /// ```
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            orientation: Quat::identity(),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Update camera orientation
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    /// Update the aspect ratio from a viewport size in pixels
    ///
    /// A zero-height viewport (minimized window) leaves the aspect untouched.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Direction the camera looks at
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::new(0.0, 0.0, -1.0)
    }

    /// Camera right vector
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::x()
    }

    /// Camera up vector
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::y()
    }

    /// Move along the camera's own axes
    pub fn translate_local(&mut self, offset: Vec3) {
        self.position += self.orientation * offset;
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
            .inverse()
            .to_homogeneous()
    }

    /// Perspective projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Perspective3::new(self.aspect, self.fov, self.near, self.far).to_homogeneous()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(Vec3::zeros(), 75.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    #[test]
    fn test_yawed_camera_axes() {
        let mut camera = Camera::default();
        camera.set_orientation(Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2));
        // Turning left by 90 degrees looks down -X
        assert_relative_eq!(camera.forward(), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(camera.right(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_translate_local() {
        let mut camera = Camera::default();
        camera.translate_local(Vec3::new(0.0, 0.0, -2.0));
        assert_relative_eq!(camera.position, Vec3::new(0.0, 0.0, -2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_view_matrix_moves_camera_to_origin() {
        let camera = Camera::perspective(Vec3::new(1.0, 2.0, 3.0), 60.0, 1.0, 0.1, 100.0);
        let eye = camera.view_matrix() * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert_relative_eq!(eye, Vector4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_viewport_aspect() {
        let mut camera = Camera::default();
        camera.set_viewport(800, 400);
        assert_relative_eq!(camera.aspect, 2.0);
        camera.set_viewport(800, 0);
        assert_relative_eq!(camera.aspect, 2.0);
    }
}
