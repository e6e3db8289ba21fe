//! Collision geometry
//!
//! Shapes are stored in body-local coordinates and transformed to world space
//! only while the solver or a ray query tests them.
//!
//! - [`primitives`] - Rays, spheres and oriented boxes
//! - [`shape`] - Body shapes, world-space shapes and contact generation

pub mod primitives;
pub mod shape;

pub use primitives::{BoundingSphere, OrientedBox, Ray};
pub use shape::{BodyShape, Contact, WorldSpaceShape};
