//! Collision layer system for filtering contacts and ray queries
//!
//! Every body carries a `group` (the layers it belongs to) and a `mask` (the
//! layers it accepts). Two bodies interact only when each one's group is in
//! the other's mask. Ray filters use the same rule, with the ray acting as a
//! body of its own.

/// Collision layer definitions
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision layer
    pub const NONE: u32 = 0;

    /// All collision layers
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Default layer for bodies that don't pick one
    pub const DEFAULT: u32 = 1 << 0;

    /// Player character layer
    pub const PLAYER: u32 = 1 << 1;

    /// Static environment geometry
    pub const ENVIRONMENT: u32 = 1 << 2;

    /// Debris and small physics objects
    pub const DEBRIS: u32 = 1 << 3;

    /// Check if two bodies should collide based on their layers and masks
    ///
    /// # Example
    /// ```
    /// use bracket_engine::physics::CollisionLayers;
    ///
    /// let player = (CollisionLayers::PLAYER, CollisionLayers::ALL);
    /// let ground = (CollisionLayers::ENVIRONMENT, CollisionLayers::ALL);
    /// assert!(CollisionLayers::should_collide(player.0, player.1, ground.0, ground.1));
    /// ```
    pub fn should_collide(layer_a: u32, mask_a: u32, layer_b: u32, mask_b: u32) -> bool {
        (layer_a & mask_b) != 0 && (layer_b & mask_a) != 0
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[u32]) -> u32 {
        layers.iter().fold(0, |acc, &layer| acc | layer)
    }

    /// Mask accepting every layer except the given ones
    pub fn all_except(layers: u32) -> u32 {
        !layers
    }
}
