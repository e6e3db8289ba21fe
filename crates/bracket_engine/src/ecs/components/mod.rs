//! ECS Components module
//!
//! Engine-provided components. Gameplay scripts live in their own crate.

pub mod mesh;
pub mod transform;

pub use mesh::MeshComponent;
pub use transform::Transform;
