//! Body shapes and contact generation
//!
//! Shapes are stored in body-local space and placed in the world on demand
//! when the solver or the query facade needs them.

use super::primitives::{BoundingSphere, OrientedBox, Ray};
use crate::foundation::math::{Quat, Vec3};

/// Collision shape of a rigid body (local space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    /// Box given by its half extents
    Cuboid {
        /// Half size along each local axis
        half_extents: Vec3,
    },
    /// Sphere given by its radius
    Sphere {
        /// Sphere radius
        radius: f32,
    },
}

impl BodyShape {
    /// Box shape from half extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Cuboid {
            half_extents: Vec3::new(hx, hy, hz),
        }
    }

    /// Sphere shape
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Principal inverse inertia for a solid shape of the given mass
    pub fn inverse_inertia(&self, mass: f32) -> Vec3 {
        if mass <= 0.0 {
            return Vec3::zeros();
        }
        match *self {
            Self::Cuboid { half_extents } => {
                let size = half_extents * 2.0;
                let (x2, y2, z2) = (size.x * size.x, size.y * size.y, size.z * size.z);
                let k = mass / 12.0;
                Vec3::new(
                    safe_recip(k * (y2 + z2)),
                    safe_recip(k * (x2 + z2)),
                    safe_recip(k * (x2 + y2)),
                )
            }
            Self::Sphere { radius } => {
                let i = 0.4 * mass * radius * radius;
                Vec3::repeat(safe_recip(i))
            }
        }
    }

    /// Place this shape in the world
    pub fn to_world_space(&self, position: Vec3, orientation: Quat) -> WorldSpaceShape {
        match *self {
            Self::Cuboid { half_extents } => {
                WorldSpaceShape::Box(OrientedBox::new(position, orientation, half_extents))
            }
            Self::Sphere { radius } => WorldSpaceShape::Sphere(BoundingSphere::new(position, radius)),
        }
    }
}

fn safe_recip(value: f32) -> f32 {
    if value > f32::EPSILON {
        1.0 / value
    } else {
        0.0
    }
}

/// World-space collision shape (temporary, for testing only)
#[derive(Debug, Clone, Copy)]
pub enum WorldSpaceShape {
    /// World-space oriented box
    Box(OrientedBox),
    /// World-space sphere
    Sphere(BoundingSphere),
}

/// Contact between two shapes
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit normal pointing from the first shape towards the second
    pub normal: Vec3,
    /// Penetration depth along the normal
    pub depth: f32,
}

impl WorldSpaceShape {
    /// Get center position
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Box(cuboid) => cuboid.center,
            Self::Sphere(sphere) => sphere.center,
        }
    }

    /// Test ray intersection with this collision shape (detailed)
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        match self {
            Self::Box(cuboid) => cuboid.intersect_ray(ray),
            Self::Sphere(sphere) => sphere.intersect_ray(ray),
        }
    }

    /// Contact with another shape, if they overlap
    ///
    /// Box-box pairs are resolved on their world-space bounding boxes; the
    /// solver never induces rotation from contacts, so resting boxes stay
    /// axis aligned.
    pub fn contact(&self, other: &WorldSpaceShape) -> Option<Contact> {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => sphere_sphere(a, b),
            (Self::Sphere(sphere), Self::Box(cuboid)) => sphere_box(sphere, cuboid),
            (Self::Box(cuboid), Self::Sphere(sphere)) => sphere_box(sphere, cuboid).map(|c| Contact {
                normal: -c.normal,
                depth: c.depth,
            }),
            (Self::Box(a), Self::Box(b)) => box_box(a, b),
        }
    }
}

fn sphere_sphere(a: &BoundingSphere, b: &BoundingSphere) -> Option<Contact> {
    let delta = b.center - a.center;
    let distance = delta.magnitude();
    let radius_sum = a.radius + b.radius;
    if distance >= radius_sum {
        return None;
    }
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec3::y()
    };
    Some(Contact {
        normal,
        depth: radius_sum - distance,
    })
}

/// Normal points from the sphere towards the box
fn sphere_box(sphere: &BoundingSphere, cuboid: &OrientedBox) -> Option<Contact> {
    let inverse = cuboid.orientation.inverse();
    let local_center = inverse * (sphere.center - cuboid.center);
    let h = cuboid.half_extents;

    let closest = Vec3::new(
        local_center.x.clamp(-h.x, h.x),
        local_center.y.clamp(-h.y, h.y),
        local_center.z.clamp(-h.z, h.z),
    );
    let offset = local_center - closest;
    let distance = offset.magnitude();

    if distance > f32::EPSILON {
        if distance >= sphere.radius {
            return None;
        }
        // Box surface to sphere center, flipped to sphere -> box
        let local_normal = -offset / distance;
        return Some(Contact {
            normal: cuboid.orientation * local_normal,
            depth: sphere.radius - distance,
        });
    }

    // Center inside the box: leave through the nearest face
    let mut best_axis = 0;
    let mut best_gap = f32::INFINITY;
    for axis in 0..3 {
        let gap = h[axis] - local_center[axis].abs();
        if gap < best_gap {
            best_gap = gap;
            best_axis = axis;
        }
    }
    let mut local_normal = Vec3::zeros();
    local_normal[best_axis] = if local_center[best_axis] >= 0.0 { -1.0 } else { 1.0 };
    Some(Contact {
        normal: cuboid.orientation * local_normal,
        depth: best_gap + sphere.radius,
    })
}

fn box_box(a: &OrientedBox, b: &OrientedBox) -> Option<Contact> {
    let extents_a = a.aabb_half_extents();
    let extents_b = b.aabb_half_extents();
    let delta = b.center - a.center;

    let mut best_axis = 0;
    let mut best_depth = f32::INFINITY;
    for axis in 0..3 {
        let overlap = extents_a[axis] + extents_b[axis] - delta[axis].abs();
        if overlap <= 0.0 {
            return None;
        }
        if overlap < best_depth {
            best_depth = overlap;
            best_axis = axis;
        }
    }

    let mut normal = Vec3::zeros();
    normal[best_axis] = if delta[best_axis] >= 0.0 { 1.0 } else { -1.0 };
    Some(Contact {
        normal,
        depth: best_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_resting_on_ground_contact() {
        let ground = BodyShape::cuboid(50.0, 0.5, 50.0).to_world_space(Vec3::new(0.0, -1.5, 0.0), Quat::identity());
        let crate_box = BodyShape::cuboid(0.5, 0.5, 0.5).to_world_space(Vec3::new(0.0, -0.55, 0.0), Quat::identity());

        let contact = ground.contact(&crate_box).unwrap();
        assert_relative_eq!(contact.normal, Vec3::y(), epsilon = 1e-6);
        assert_relative_eq!(contact.depth, 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_separated_boxes() {
        let a = BodyShape::cuboid(0.5, 0.5, 0.5).to_world_space(Vec3::zeros(), Quat::identity());
        let b = BodyShape::cuboid(0.5, 0.5, 0.5).to_world_space(Vec3::new(0.0, 1.5, 0.0), Quat::identity());
        assert!(a.contact(&b).is_none());
    }

    #[test]
    fn test_sphere_on_box_normal_points_into_box() {
        let sphere = BodyShape::sphere(0.5).to_world_space(Vec3::new(0.0, 0.4, 0.0), Quat::identity());
        let ground = BodyShape::cuboid(5.0, 0.5, 5.0).to_world_space(Vec3::new(0.0, -0.5, 0.0), Quat::identity());

        let contact = sphere.contact(&ground).unwrap();
        assert_relative_eq!(contact.normal, -Vec3::y(), epsilon = 1e-6);
        assert_relative_eq!(contact.depth, 0.1, epsilon = 1e-5);

        let flipped = ground.contact(&sphere).unwrap();
        assert_relative_eq!(flipped.normal, Vec3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_sphere() {
        let a = BodyShape::sphere(1.0).to_world_space(Vec3::zeros(), Quat::identity());
        let b = BodyShape::sphere(1.0).to_world_space(Vec3::new(1.5, 0.0, 0.0), Quat::identity());
        let contact = a.contact(&b).unwrap();
        assert_relative_eq!(contact.normal, Vec3::x(), epsilon = 1e-6);
        assert_relative_eq!(contact.depth, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_static_inertia_is_zero() {
        assert_eq!(BodyShape::cuboid(1.0, 1.0, 1.0).inverse_inertia(0.0), Vec3::zeros());
        let inv = BodyShape::sphere(1.0).inverse_inertia(1.0);
        assert_relative_eq!(inv.x, 2.5, epsilon = 1e-6);
    }
}
