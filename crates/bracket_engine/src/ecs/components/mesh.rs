//! Mesh component for entities that can be rendered
//!
//! The component holds geometry, either given up front or loaded in the
//! background from a file when it starts, plus one material per primitive.
//! Each update mirrors the entity transform into its render instance; the
//! instance is added to every frame snapshot once the geometry is available.

use std::sync::Arc;

use crate::assets::PendingAsset;
use crate::ecs::{Component, ComponentError, ComponentKind, Context, EntityId, Transform};
use crate::render::{FrameSnapshot, Material, MeshData, RenderInstance};

enum MeshSource {
    Ready(Arc<MeshData>),
    Path(String),
    Loading(String, PendingAsset<Option<MeshData>>),
    Failed(String),
}

/// Component for entities that can be rendered
pub struct MeshComponent {
    source: MeshSource,
    materials: Vec<Material>,
    cast_shadows: bool,
    receive_shadows: bool,
    visible: bool,
    instance: Transform,
}

impl MeshComponent {
    /// Render already loaded geometry
    pub fn new(mesh: Arc<MeshData>) -> Self {
        Self::with_source(MeshSource::Ready(mesh))
    }

    /// Load geometry from a file when the component starts
    ///
    /// The load runs in the background; nothing is drawn until it finishes.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::with_source(MeshSource::Path(path.into()))
    }

    fn with_source(source: MeshSource) -> Self {
        Self {
            source,
            materials: vec![Material::default()],
            cast_shadows: true,
            receive_shadows: true,
            visible: true,
            instance: Transform::default(),
        }
    }

    /// Builder pattern: Set materials, one per primitive
    pub fn with_materials(mut self, materials: Vec<Material>) -> Self {
        self.materials = materials;
        self
    }

    /// Builder pattern: Set a single material for every primitive
    pub fn with_material(self, material: Material) -> Self {
        self.with_materials(vec![material])
    }

    /// Builder pattern: Set shadow flags
    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadows = cast;
        self.receive_shadows = receive;
        self
    }

    /// Geometry, once loaded
    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        match &self.source {
            MeshSource::Ready(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Whether geometry is available
    pub fn is_loaded(&self) -> bool {
        matches!(self.source, MeshSource::Ready(_))
    }

    /// Whether a load from file failed
    pub fn load_failed(&self) -> bool {
        matches!(self.source, MeshSource::Failed(_))
    }

    /// Materials in primitive order
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Mutable materials
    pub fn materials_mut(&mut self) -> &mut Vec<Material> {
        &mut self.materials
    }

    /// Set visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Transform of the render instance as of the last update
    pub fn instance_transform(&self) -> &Transform {
        &self.instance
    }

    fn poll_load(&mut self) {
        let MeshSource::Loading(path, pending) = &self.source else {
            return;
        };
        self.source = match pending.try_take() {
            Ok(None) => return,
            Ok(Some(Some(mesh))) => {
                log::debug!("Mesh '{}' ready ({} triangles)", path, mesh.triangle_count());
                MeshSource::Ready(Arc::new(mesh))
            }
            Ok(Some(None)) => MeshSource::Failed(path.clone()),
            Err(e) => {
                log::warn!("Mesh '{}' failed: {}", path, e);
                MeshSource::Failed(path.clone())
            }
        };
    }
}

impl Component for MeshComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Mesh
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        self.instance = ctx.transform();
        if let MeshSource::Path(path) = &self.source {
            let pending = ctx.loader().request_mesh(path);
            self.source = MeshSource::Loading(path.clone(), pending);
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, _dt: f32) {
        self.poll_load();
        self.instance = ctx.transform();
    }

    fn contribute(&self, entity: EntityId, transform: &Transform, frame: &mut FrameSnapshot) {
        let MeshSource::Ready(mesh) = &self.source else {
            return;
        };
        if !self.visible {
            return;
        }
        frame.push_instance(RenderInstance {
            entity,
            mesh: Arc::clone(mesh),
            materials: self.materials.clone(),
            transform: *transform,
            cast_shadows: self.cast_shadows,
            receive_shadows: self.receive_shadows,
        });
    }
}

impl std::fmt::Debug for MeshComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            MeshSource::Ready(mesh) => format!("ready({})", mesh.name),
            MeshSource::Path(path) => format!("pending({path})"),
            MeshSource::Loading(path, _) => format!("loading({path})"),
            MeshSource::Failed(path) => format!("failed({path})"),
        };
        f.debug_struct("MeshComponent")
            .field("source", &source)
            .field("materials", &self.materials.len())
            .field("cast_shadows", &self.cast_shadows)
            .field("receive_shadows", &self.receive_shadows)
            .finish()
    }
}
