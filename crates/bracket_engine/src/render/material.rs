//! Surface materials attached to mesh components

use std::sync::Arc;

use crate::assets::Texture;

/// Lighting model of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// Affected by scene lights
    #[default]
    Lit,
    /// Flat color, ignores lights
    Unlit,
}

/// Material properties for a mesh primitive
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color (RGB)
    pub base_color: [f32; 3],

    /// Alpha/transparency (0.0 = transparent, 1.0 = opaque)
    pub alpha: f32,

    /// Lighting model
    pub shading: Shading,

    /// Color texture, multiplied with the base color
    pub texture: Option<Arc<Texture>>,
}

impl Material {
    /// White lit material
    pub fn new() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0],
            alpha: 1.0,
            shading: Shading::Lit,
            texture: None,
        }
    }

    /// White unlit material
    pub fn unlit() -> Self {
        Self {
            shading: Shading::Unlit,
            ..Self::new()
        }
    }

    /// Set the base color
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.base_color = [r, g, b];
        self
    }

    /// Set the alpha/transparency
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Attach a color texture
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}
