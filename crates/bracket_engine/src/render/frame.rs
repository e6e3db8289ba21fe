//! Per-frame data handed to the render backend
//!
//! The engine builds one [`FrameSnapshot`] per variable tick: the camera,
//! every drawable instance contributed by components, and the HUD text.

use std::sync::Arc;
use std::time::Duration;

use crate::ecs::{EntityId, Transform};
use crate::render::{Camera, Material, MeshData};

/// One drawable mesh placed in the world
#[derive(Debug, Clone)]
pub struct RenderInstance {
    /// Entity the instance belongs to
    pub entity: EntityId,
    /// Geometry
    pub mesh: Arc<MeshData>,
    /// Materials, applied to primitives in order
    pub materials: Vec<Material>,
    /// World transform
    pub transform: Transform,
    /// Whether the instance casts shadows
    pub cast_shadows: bool,
    /// Whether the instance receives shadows
    pub receive_shadows: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshot {
    /// Variable tick counter
    pub frame: u64,
    /// Engine time when the frame was built
    pub time: Duration,
    /// Active camera, `None` until the application sets one
    pub camera: Option<Camera>,
    /// Drawable instances
    pub instances: Vec<RenderInstance>,
    /// HUD sinks as (name, text)
    pub hud: Vec<(String, String)>,
}

impl FrameSnapshot {
    /// Empty snapshot for a frame
    pub fn new(frame: u64, time: Duration, camera: Option<Camera>) -> Self {
        Self {
            frame,
            time,
            camera,
            instances: Vec::new(),
            hud: Vec::new(),
        }
    }

    /// Add a drawable instance
    pub fn push_instance(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    /// Instances belonging to an entity
    pub fn instances_of(&self, entity: EntityId) -> impl Iterator<Item = &RenderInstance> {
        self.instances.iter().filter(move |i| i.entity == entity)
    }

    /// Text of a HUD sink in this frame
    pub fn hud_text(&self, sink: &str) -> Option<&str> {
        self.hud
            .iter()
            .find(|(name, _)| name == sink)
            .map(|(_, text)| text.as_str())
    }
}
