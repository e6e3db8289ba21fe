//! Resource loader: format dispatch, texture fallback and background loads
//!
//! Meshes are routed to an importer by file extension. Textures that fail to
//! load are replaced by a single configured fallback. Both have background
//! variants that return a [`PendingAsset`] so neither clock ever blocks on
//! disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{bounded, Receiver, TryRecvError};

use crate::assets::obj_loader::ObjLoader;
use crate::assets::scene_loader::SceneLoader;
use crate::assets::{AssetError, Texture};
use crate::config::AssetConfig;
use crate::render::MeshData;

/// Importer family chosen from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Flat vertex lists (`.obj`)
    TriangleSoup,
    /// Node hierarchies (`.fbx`, `.gltf`, `.glb`)
    SceneGraph,
}

impl MeshFormat {
    /// Pick the format for a path, case-insensitively
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "obj" => Some(Self::TriangleSoup),
            "fbx" | "gltf" | "glb" => Some(Self::SceneGraph),
            _ => None,
        }
    }
}

/// Turns a mesh file into geometry
pub trait MeshImporter: Send + Sync {
    /// Import the file at `path`
    fn import(&self, path: &Path) -> Result<MeshData, AssetError>;
}

/// Turns an image file into a texture
pub trait TextureSource: Send + Sync {
    /// Load the image at `path`
    fn load(&self, path: &Path) -> Result<Texture, AssetError>;
}

/// OBJ importer
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl MeshImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<MeshData, AssetError> {
        ObjLoader::load_obj(path).map_err(|e| AssetError::LoadFailed(format!("{}: {}", path.display(), e)))
    }
}

/// Scene-graph importer backed by the `gltf` crate
///
/// `.fbx` files are routed here too; anything the importer cannot parse is
/// reported as a load failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct SceneImporter;

impl MeshImporter for SceneImporter {
    fn import(&self, path: &Path) -> Result<MeshData, AssetError> {
        SceneLoader::load_scene(path).map_err(|e| AssetError::LoadFailed(format!("{}: {}", path.display(), e)))
    }
}

/// Texture source reading image files from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct FileTextureSource;

impl TextureSource for FileTextureSource {
    fn load(&self, path: &Path) -> Result<Texture, AssetError> {
        if !path.exists() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }
        Texture::from_file(path)
    }
}

/// Result of a background load, polled without blocking
pub struct PendingAsset<T> {
    receiver: Receiver<T>,
}

impl<T> PendingAsset<T> {
    /// Take the result if the load has finished
    ///
    /// `Ok(None)` while the worker is still busy. A worker that stopped
    /// without sending anything is reported as [`AssetError::LoadFailed`].
    pub fn try_take(&self) -> Result<Option<T>, AssetError> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(AssetError::LoadFailed("loader worker stopped".to_string())),
        }
    }

    /// Block until the load finishes; `None` if the worker died
    pub fn wait(self) -> Option<T> {
        self.receiver.recv().ok()
    }
}

/// Mesh and texture loader
#[derive(Clone)]
pub struct ResourceLoader {
    config: AssetConfig,
    triangle_soup: Arc<dyn MeshImporter>,
    scene_graph: Arc<dyn MeshImporter>,
    textures: Arc<dyn TextureSource>,
}

impl ResourceLoader {
    /// Loader with the built-in file importers
    pub fn new(config: AssetConfig) -> Self {
        Self {
            config,
            triangle_soup: Arc::new(ObjImporter),
            scene_graph: Arc::new(SceneImporter),
            textures: Arc::new(FileTextureSource),
        }
    }

    /// Replace the importer used for a format
    pub fn with_importer(mut self, format: MeshFormat, importer: Arc<dyn MeshImporter>) -> Self {
        match format {
            MeshFormat::TriangleSoup => self.triangle_soup = importer,
            MeshFormat::SceneGraph => self.scene_graph = importer,
        }
        self
    }

    /// Replace the texture source
    pub fn with_texture_source(mut self, source: Arc<dyn TextureSource>) -> Self {
        self.textures = source;
        self
    }

    /// Asset configuration
    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Resolve a path against the search paths, in order, then as given
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.config
            .search_paths
            .iter()
            .map(|root| Path::new(root).join(path))
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| PathBuf::from(path))
    }

    /// Load a mesh, choosing the importer by extension
    ///
    /// Unknown extensions and importer failures are logged and yield `None`.
    pub fn load_mesh(&self, path: &str) -> Option<MeshData> {
        let Some(format) = MeshFormat::from_path(path) else {
            log::warn!("No mesh importer for '{}'", path);
            return None;
        };

        let importer = match format {
            MeshFormat::TriangleSoup => &self.triangle_soup,
            MeshFormat::SceneGraph => &self.scene_graph,
        };

        match importer.import(&self.resolve(path)) {
            Ok(mesh) => {
                log::debug!("Loaded mesh '{}' ({:?}, {} vertices)", path, format, mesh.vertex_count());
                Some(mesh)
            }
            Err(e) => {
                log::warn!("Failed to load mesh '{}': {}", path, e);
                None
            }
        }
    }

    /// Load a texture, substituting the fallback texture on failure
    ///
    /// Only a failing fallback is reported as an error.
    pub fn load_texture(&self, path: &str) -> Result<Texture, AssetError> {
        let error = match self.textures.load(&self.resolve(path)) {
            Ok(texture) => return Ok(texture),
            Err(e) => e,
        };

        let fallback = &self.config.fallback_texture;
        log::error!("Failed to load texture '{}': {}. Loading fallback '{}'", path, error, fallback);

        match self.textures.load(&self.resolve(fallback)) {
            Ok(mut texture) => {
                texture.is_fallback = true;
                Ok(texture)
            }
            Err(fallback_error) => {
                log::error!("Failed to load fallback texture '{}': {}", fallback, fallback_error);
                Err(AssetError::FallbackFailed {
                    path: path.to_string(),
                    fallback: fallback.clone(),
                    reason: fallback_error.to_string(),
                })
            }
        }
    }

    /// Load a mesh on a background thread
    pub fn request_mesh(&self, path: &str) -> PendingAsset<Option<MeshData>> {
        let path = path.to_string();
        self.spawn_load(move |loader| loader.load_mesh(&path))
    }

    /// Load a texture on a background thread
    pub fn request_texture(&self, path: &str) -> PendingAsset<Result<Texture, AssetError>> {
        let path = path.to_string();
        self.spawn_load(move |loader| loader.load_texture(&path))
    }

    fn spawn_load<T, F>(&self, job: F) -> PendingAsset<T>
    where
        T: Send + 'static,
        F: FnOnce(&ResourceLoader) -> T + Send + 'static,
    {
        let (sender, receiver) = bounded(1);
        let loader = self.clone();
        let job = Arc::new(std::sync::Mutex::new(Some(job)));
        let worker_job = Arc::clone(&job);
        let worker_sender = sender.clone();

        let spawned = thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                let job = worker_job
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .take();
                if let Some(job) = job {
                    // The requester may have dropped its handle
                    let _ = worker_sender.send(job(&loader));
                }
            });

        if let Err(e) = spawned {
            log::warn!("Could not start loader thread ({}), loading inline", e);
            let job = job.lock().unwrap_or_else(std::sync::PoisonError::into_inner).take();
            if let Some(job) = job {
                let _ = sender.send(job(self));
            }
        }

        PendingAsset { receiver }
    }
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new(AssetConfig::default())
    }
}

impl std::fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader").field("config", &self.config).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingImporter {
        calls: Mutex<Vec<PathBuf>>,
    }

    impl MeshImporter for RecordingImporter {
        fn import(&self, path: &Path) -> Result<MeshData, AssetError> {
            self.calls.lock().unwrap().push(path.to_path_buf());
            Ok(MeshData::cube(path.to_string_lossy()))
        }
    }

    struct FailingImporter;

    impl MeshImporter for FailingImporter {
        fn import(&self, path: &Path) -> Result<MeshData, AssetError> {
            Err(AssetError::InvalidData(path.display().to_string()))
        }
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        assert_eq!(MeshFormat::from_path("foo.obj"), Some(MeshFormat::TriangleSoup));
        assert_eq!(MeshFormat::from_path("Models/Foo.FBX"), Some(MeshFormat::SceneGraph));
        assert_eq!(MeshFormat::from_path("a.glb"), Some(MeshFormat::SceneGraph));
        assert_eq!(MeshFormat::from_path("a.stl"), None);
        assert_eq!(MeshFormat::from_path("noext"), None);
    }

    #[test]
    fn test_load_mesh_routes_to_importer() {
        let soup = Arc::new(RecordingImporter::default());
        let scene = Arc::new(RecordingImporter::default());
        let loader = ResourceLoader::new(AssetConfig::default())
            .with_importer(MeshFormat::TriangleSoup, soup.clone())
            .with_importer(MeshFormat::SceneGraph, scene.clone());

        assert!(loader.load_mesh("foo.obj").is_some());
        assert!(loader.load_mesh("foo.fbx").is_some());

        assert_eq!(*soup.calls.lock().unwrap(), vec![PathBuf::from("foo.obj")]);
        assert_eq!(*scene.calls.lock().unwrap(), vec![PathBuf::from("foo.fbx")]);
    }

    #[test]
    fn test_unknown_extension_and_failures_yield_none() {
        let loader = ResourceLoader::default().with_importer(MeshFormat::TriangleSoup, Arc::new(FailingImporter));
        assert!(loader.load_mesh("model.stl").is_none());
        assert!(loader.load_mesh("model.obj").is_none());
    }

    #[test]
    fn test_search_paths_resolve_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("cube.obj"), "v 0 0 0\n").unwrap();

        let config = AssetConfig {
            search_paths: vec![
                first.path().to_string_lossy().into_owned(),
                second.path().to_string_lossy().into_owned(),
            ],
            ..AssetConfig::default()
        };
        let loader = ResourceLoader::new(config);
        assert_eq!(loader.resolve("cube.obj"), second.path().join("cube.obj"));
        assert_eq!(loader.resolve("missing.obj"), PathBuf::from("missing.obj"));
    }

    #[test]
    fn test_request_mesh_completes_off_thread() {
        let loader = ResourceLoader::default().with_importer(MeshFormat::TriangleSoup, Arc::new(RecordingImporter::default()));
        let pending = loader.request_mesh("cube.obj");
        let mesh = pending.wait().flatten().unwrap();
        assert_eq!(mesh.triangle_count(), 12);
    }

    struct PanickingImporter;

    impl MeshImporter for PanickingImporter {
        fn import(&self, path: &Path) -> Result<MeshData, AssetError> {
            panic!("importer crashed on {}", path.display());
        }
    }

    #[test]
    fn test_dead_worker_is_reported_as_failure() {
        let loader = ResourceLoader::default().with_importer(MeshFormat::TriangleSoup, Arc::new(PanickingImporter));
        let pending = loader.request_mesh("cube.obj");

        let mut outcome = Ok(None);
        for _ in 0..400 {
            outcome = pending.try_take();
            if !matches!(outcome, Ok(None)) {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(matches!(outcome, Err(AssetError::LoadFailed(_))));
    }
}
