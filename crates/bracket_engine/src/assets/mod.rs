//! Asset loading
//!
//! - [`ResourceLoader`]: extension dispatch, texture fallback, background loads
//! - [`ObjLoader`]: triangle-soup importer for `.obj`
//! - [`SceneLoader`]: scene-graph importer built on the `gltf` crate
//! - [`Texture`]: decoded RGBA8 image

pub mod image_loader;
pub mod loader;
pub mod obj_loader;
pub mod scene_loader;

pub use image_loader::Texture;
pub use loader::{
    FileTextureSource, MeshFormat, MeshImporter, ObjImporter, PendingAsset, ResourceLoader, SceneImporter,
    TextureSource,
};
pub use obj_loader::{ObjError, ObjLoader};
pub use scene_loader::{SceneError, SceneLoader};

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unsupported asset format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Both the requested texture and the fallback texture failed
    #[error("Texture '{path}' failed and fallback '{fallback}' failed too: {reason}")]
    FallbackFailed {
        /// Requested texture
        path: String,
        /// Fallback that was tried
        fallback: String,
        /// Why the fallback failed
        reason: String,
    },

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
