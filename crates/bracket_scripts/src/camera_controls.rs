//! Free-fly camera controls

use bracket_engine::prelude::*;

use crate::look::MouseLook;

/// Flies the engine camera with WASD, Space/Control and the mouse
#[derive(Debug, Clone)]
pub struct CameraControls {
    /// Mouse look state
    pub look: MouseLook,
    /// Units per second
    pub move_speed: f32,
}

impl CameraControls {
    /// Default sensitivity and speed
    pub fn new() -> Self {
        Self {
            look: MouseLook::new(1.0),
            move_speed: 5.0,
        }
    }

    /// Builder pattern: Set movement speed
    pub fn with_speed(mut self, move_speed: f32) -> Self {
        self.move_speed = move_speed;
        self
    }

    fn direction(input: &InputManager) -> Vec3 {
        let direction = Vec3::new(
            input.axis(KeyCode::A, KeyCode::D),
            input.axis(KeyCode::Control, KeyCode::Space),
            input.axis(KeyCode::W, KeyCode::S),
        );
        direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
    }
}

impl Default for CameraControls {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CameraControls {
    fn kind(&self) -> ComponentKind {
        ComponentKind::CameraControls
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        if ctx.camera().is_none() {
            return Err(ComponentError::MissingCamera);
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, dt: f32) {
        let orientation = self.look.apply(ctx.input(), dt);
        let offset = Self::direction(ctx.input()) * self.move_speed * dt;

        let Some(camera) = ctx.camera_mut() else {
            return;
        };
        if let Some(orientation) = orientation {
            camera.set_orientation(orientation);
        }
        camera.translate_local(offset);
    }
}
