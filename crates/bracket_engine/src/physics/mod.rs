//! Physics module: rigid bodies, contact resolution and ray queries
//!
//! The [`PhysicsWorld`] owns every body and advances them one fixed step at
//! a time. Gameplay code reads it through [`SpatialQuery`].

pub mod body;
pub mod collision;
pub mod collision_layers;
pub mod query;
pub mod world;

pub use body::{BodyDesc, BodyHandle, PhysicsMaterial, RigidBody};
pub use collision::{BodyShape, Ray};
pub use collision_layers::CollisionLayers;
pub use query::{RayFilter, RaycastResult, SpatialQuery};
pub use world::PhysicsWorld;
