//! Primitive collision shapes and intersection algorithms
//!
//! Provides rays, spheres and oriented boxes with ray intersection tests used
//! by the query facade.

use crate::foundation::math::{Quat, Vec3};

/// A ray for ray casting
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Build a ray from a segment, returning the ray and the segment length
    ///
    /// Returns `None` for a zero-length segment.
    pub fn from_segment(from: Vec3, to: Vec3) -> Option<(Self, f32)> {
        let delta = to - from;
        let length = delta.magnitude();
        if length <= f32::EPSILON {
            return None;
        }
        Some((
            Self {
                origin: from,
                direction: delta / length,
            },
            length,
        ))
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Test ray intersection with this sphere
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        // Solve: |origin + t*direction - center|^2 = radius^2
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        // Closest non-negative root; an origin inside the sphere hits the far side
        let t = if t1 >= 0.0 {
            t1
        } else if t2 >= 0.0 {
            t2
        } else {
            return None;
        };

        let hit_point = ray.point_at(t);
        let normal = (hit_point - self.center).normalize();
        Some((t, hit_point, normal))
    }
}

/// An oriented box in world space
#[derive(Debug, Clone, Copy)]
pub struct OrientedBox {
    /// Box center
    pub center: Vec3,
    /// Box orientation
    pub orientation: Quat,
    /// Half size along each local axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Creates a new oriented box
    pub fn new(center: Vec3, orientation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            orientation,
            half_extents,
        }
    }

    /// Half extents of the world-space axis-aligned box enclosing this box
    pub fn aabb_half_extents(&self) -> Vec3 {
        let rotation = self.orientation.to_rotation_matrix();
        rotation.matrix().abs() * self.half_extents
    }

    /// Slab test in the box's local frame
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        let inverse = self.orientation.inverse();
        let origin = inverse * (ray.origin - self.center);
        let direction = inverse * ray.direction;

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut enter_axis = 0;
        let mut exit_axis = 0;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let h = self.half_extents[axis];

            if d.abs() < 1e-8 {
                // Parallel to this slab: must already be inside it
                if o < -h || o > h {
                    return None;
                }
                continue;
            }

            let mut t0 = (-h - o) / d;
            let mut t1 = (h - o) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                enter_axis = axis;
            }
            if t1 < t_exit {
                t_exit = t1;
                exit_axis = axis;
            }
            if t_enter > t_exit {
                return None;
            }
        }

        if t_exit < 0.0 {
            return None;
        }

        let (t, axis) = if t_enter >= 0.0 {
            (t_enter, enter_axis)
        } else {
            (t_exit, exit_axis)
        };

        let local_hit = origin + direction * t;
        let mut local_normal = Vec3::zeros();
        local_normal[axis] = if local_hit[axis] >= 0.0 { 1.0 } else { -1.0 };

        Some((t, ray.point_at(t), self.orientation * local_normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_ray() {
        let (ray, length) = Ray::from_segment(Vec3::zeros(), Vec3::new(0.0, -2.0, 0.0)).unwrap();
        assert_relative_eq!(length, 2.0);
        assert_relative_eq!(ray.direction, Vec3::new(0.0, -1.0, 0.0));
        assert!(Ray::from_segment(Vec3::zeros(), Vec3::zeros()).is_none());
    }

    #[test]
    fn test_sphere_hit_and_miss() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let hit = sphere.intersect_ray(&Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0)));
        let (t, point, normal) = hit.unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(point, Vec3::new(0.0, 0.0, -4.0), epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);

        let miss = sphere.intersect_ray(&Ray::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0)));
        assert!(miss.is_none());
    }

    #[test]
    fn test_box_hit_top_face() {
        let ground = OrientedBox::new(Vec3::new(0.0, -2.0, 0.0), Quat::identity(), Vec3::new(5.0, 1.0, 5.0));
        let ray = Ray::new(Vec3::new(0.5, 3.0, 0.5), Vec3::new(0.0, -1.0, 0.0));
        let (t, point, normal) = ground.intersect_ray(&ray).unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(point.y, -1.0, epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_rotated_box() {
        let rotated = OrientedBox::new(
            Vec3::zeros(),
            Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_4),
            Vec3::new(1.0, 1.0, 1.0),
        );
        // The corner of the rotated unit box points along +X at sqrt(2)
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let (t, _, _) = rotated.intersect_ray(&ray).unwrap();
        assert_relative_eq!(t, 5.0 - 2.0_f32.sqrt(), epsilon = 1e-4);

        let extents = rotated.aabb_half_extents();
        assert_relative_eq!(extents.x, 2.0_f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_box_behind_ray_is_missed() {
        let cube = OrientedBox::new(Vec3::new(0.0, 0.0, 5.0), Quat::identity(), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert!(cube.intersect_ray(&ray).is_none());
    }
}
