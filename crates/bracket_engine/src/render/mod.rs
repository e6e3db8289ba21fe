//! # Rendering Interface
//!
//! The engine only describes what should be drawn. Each variable tick it
//! collects a [`FrameSnapshot`] (camera, mesh instances, HUD text) and hands
//! it to a [`RenderBackend`]. Drawing is the backend's business.
//!
//! - [`Camera`]: engine-owned perspective camera
//! - [`MeshData`] / [`Material`]: what mesh components carry
//! - [`NullRenderer`] / [`RecordingRenderer`]: built-in backends for headless
//!   hosts and tests

pub mod backend;
pub mod camera;
pub mod frame;
pub mod material;
pub mod mesh;

pub use backend::{NullRenderer, RecordingRenderer, RenderBackend, RenderError};
pub use camera::Camera;
pub use frame::{FrameSnapshot, RenderInstance};
pub use material::{Material, Shading};
pub use mesh::{MeshData, MeshPrimitive, Vertex};
