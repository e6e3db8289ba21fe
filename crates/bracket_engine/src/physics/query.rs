//! Raycast facade over the physics world
//!
//! Gameplay code senses the world through [`SpatialQuery`], which borrows the
//! physics world immutably for the duration of the query.

use crate::foundation::math::Vec3;
use crate::physics::body::{BodyHandle, RigidBody};
use crate::physics::collision::Ray;
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::world::PhysicsWorld;

/// Layer filter applied to ray queries
///
/// A body is considered when `body.group & mask != 0` and
/// `body.mask & group != 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayFilter {
    /// Layers the ray accepts
    pub mask: u32,
    /// Layers the ray belongs to
    pub group: u32,
}

impl RayFilter {
    /// Filter accepting every body
    pub const ALL: RayFilter = RayFilter {
        mask: CollisionLayers::ALL,
        group: CollisionLayers::ALL,
    };

    /// Create a filter
    pub fn new(mask: u32, group: u32) -> Self {
        Self { mask, group }
    }

    /// Filter accepting everything except bodies in `group`
    pub fn excluding(group: u32) -> Self {
        Self {
            mask: CollisionLayers::all_except(group),
            group: CollisionLayers::ALL,
        }
    }

    /// Check a body against the filter
    pub fn accepts(&self, body: &RigidBody) -> bool {
        (body.group & self.mask) != 0 && (body.mask & self.group) != 0
    }
}

impl Default for RayFilter {
    fn default() -> Self {
        Self::ALL
    }
}

/// Outcome of a raycast; a miss has `has_hit == false`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastResult {
    /// Whether anything was hit
    pub has_hit: bool,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at the hit point
    pub normal: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
    /// Body that was hit
    pub body: Option<BodyHandle>,
}

impl RaycastResult {
    /// Result for a ray that hit nothing
    pub fn miss() -> Self {
        Self {
            has_hit: false,
            point: Vec3::zeros(),
            normal: Vec3::zeros(),
            distance: f32::INFINITY,
            body: None,
        }
    }
}

impl Default for RaycastResult {
    fn default() -> Self {
        Self::miss()
    }
}

/// Read-only view of the physics world for ray queries
pub struct SpatialQuery<'a> {
    world: &'a PhysicsWorld,
}

impl<'a> SpatialQuery<'a> {
    /// Borrow a world for querying
    pub fn new(world: &'a PhysicsWorld) -> Self {
        Self { world }
    }

    /// Closest hit along the segment from `origin` to `target`
    pub fn raycast_closest(&self, origin: Vec3, target: Vec3, filter: RayFilter) -> RaycastResult {
        self.hits(origin, target, filter)
            .into_iter()
            .next()
            .unwrap_or_else(RaycastResult::miss)
    }

    /// Visit every body intersected by the segment, nearest first
    ///
    /// Returns the number of hits visited.
    pub fn raycast_all<F>(&self, origin: Vec3, target: Vec3, filter: RayFilter, mut callback: F) -> usize
    where
        F: FnMut(&RaycastResult),
    {
        let hits = self.hits(origin, target, filter);
        for hit in &hits {
            callback(hit);
        }
        hits.len()
    }

    fn hits(&self, origin: Vec3, target: Vec3, filter: RayFilter) -> Vec<RaycastResult> {
        let Some((ray, length)) = Ray::from_segment(origin, target) else {
            return Vec::new();
        };

        let mut hits: Vec<RaycastResult> = self
            .world
            .iter()
            .filter(|(_, body)| filter.accepts(body))
            .filter_map(|(handle, body)| {
                let (distance, point, normal) = body.world_shape().intersect_ray(&ray)?;
                (distance <= length).then_some(RaycastResult {
                    has_hit: true,
                    point,
                    normal,
                    distance,
                    body: Some(handle),
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
