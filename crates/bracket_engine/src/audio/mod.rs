//! Audio listener
//!
//! Sound output is the host's business; the engine only keeps a listener
//! glued to the camera so hosts can position sounds relative to it. The
//! listener is created lazily the first time a camera exists.

use crate::foundation::math::{Quat, Vec3};
use crate::render::Camera;

/// Distance attenuation settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttenuationConfig {
    /// Maximum audible distance from listener
    pub max_distance: f32,
    /// Reference distance for attenuation (no falloff)
    pub reference_distance: f32,
    /// Falloff exponent (1.0 = linear, 2.0 = inverse square)
    pub falloff_exponent: f32,
}

impl Default for AttenuationConfig {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            reference_distance: 1.0,
            falloff_exponent: 1.0,
        }
    }
}

/// Listener attached to the camera
#[derive(Debug, Clone, PartialEq)]
pub struct AudioListener {
    /// Listener position
    pub position: Vec3,
    /// Listener orientation
    pub orientation: Quat,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
    /// Distance attenuation
    pub attenuation: AttenuationConfig,
}

impl AudioListener {
    /// Listener placed at the camera
    pub fn at_camera(camera: &Camera) -> Self {
        Self {
            position: camera.position,
            orientation: camera.orientation,
            volume: 1.0,
            attenuation: AttenuationConfig::default(),
        }
    }

    /// Follow the camera pose
    pub fn attach(&mut self, camera: &Camera) {
        self.position = camera.position;
        self.orientation = camera.orientation;
    }

    /// Gain for a sound emitted at `source`
    pub fn gain(&self, source: Vec3) -> f32 {
        let config = &self.attenuation;
        let distance = (source - self.position).norm();

        // Beyond max distance, sound is inaudible
        if distance > config.max_distance {
            return 0.0;
        }

        // Within reference distance, no attenuation
        if distance <= config.reference_distance {
            return self.volume;
        }

        let normalized_distance =
            (distance - config.reference_distance) / (config.max_distance - config.reference_distance);
        let attenuation: f32 = 1.0 - normalized_distance.powf(config.falloff_exponent);
        attenuation.max(0.0) * self.volume
    }
}
