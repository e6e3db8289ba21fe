//! Mouse look shared by the camera and player controls

use bracket_engine::foundation::math::constants::DEG_TO_RAD;
use bracket_engine::prelude::*;

/// Accumulated yaw/pitch driven by relative mouse motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseLook {
    /// Radians per unit of mouse motion per second
    pub sensitivity: f32,
    /// Rotation about the world Y axis
    pub yaw: f32,
    /// Rotation about the local X axis, clamped to straight up/down
    pub pitch: f32,
}

impl MouseLook {
    /// Start looking down -Z
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Feed this frame's mouse motion; returns the new orientation if the
    /// mouse moved
    pub fn apply(&mut self, input: &InputManager, dt: f32) -> Option<Quat> {
        if !input.mouse_moved() {
            return None;
        }
        let (dx, dy) = input.mouse_delta();
        let scale = self.sensitivity * dt;
        self.yaw -= dx * scale;
        self.pitch = (self.pitch - dy * scale).clamp(-90.0 * DEG_TO_RAD, 90.0 * DEG_TO_RAD);
        Some(self.orientation())
    }

    /// Yaw then pitch
    pub fn orientation(&self) -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), self.yaw) * Quat::from_axis_angle(&Vec3::x_axis(), self.pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_still_mouse_keeps_orientation() {
        let mut look = MouseLook::new(1.0);
        assert!(look.apply(&InputManager::new(), 0.016).is_none());
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut input = InputManager::new();
        input.handle_mouse_motion(0.0, -10_000.0);
        let mut look = MouseLook::new(1.0);
        look.apply(&input, 1.0);
        assert_relative_eq!(look.pitch, std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_moving_right_turns_right() {
        let mut input = InputManager::new();
        input.handle_mouse_motion(10.0, 0.0);
        let mut look = MouseLook::new(0.1);
        let q = look.apply(&input, 1.0).unwrap();
        let forward = q * Vec3::new(0.0, 0.0, -1.0);
        assert!(forward.x > 0.0);
    }
}
