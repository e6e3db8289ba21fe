//! # Bracket Engine
//!
//! A small real-time simulation runtime. Entities carry components and an
//! optional rigid body; the engine advances them with two independent
//! clocks, a variable-rate presentation clock and a fixed-rate physics clock,
//! and keeps every entity transform in step with its body.
//!
//! ## Features
//!
//! - **Components**: lifecycle hooks with no-op defaults and an explicit
//!   [`ecs::Context`]
//! - **Physics**: boxes and spheres, impulse contacts, layered raycasts
//! - **Assets**: OBJ and glTF meshes, PNG textures, background loading
//! - **Rendering interface**: per-frame snapshots handed to a pluggable backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bracket_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.set_camera(Camera::default());
//!         engine.add_game_object(Entity::named("cube").with_position(Vec3::new(0.0, 5.0, 0.0)));
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!     engine.run(&mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod audio;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod ui;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, ResourceLoader, Texture},
        config::{Config, EngineConfig},
        ecs::{
            Component, ComponentError, ComponentId, ComponentKind, Context, Cooldown, Entity, EntityId,
            MeshComponent, TimerTag, Transform,
        },
        foundation::{
            math::{Quat, Vec3},
            time::{ManualClock, SystemClock, TimeSource},
        },
        input::{InputManager, KeyCode, MouseButton},
        physics::{BodyDesc, BodyShape, CollisionLayers, PhysicsMaterial, RayFilter, RaycastResult},
        render::{Camera, Material, MeshData, RecordingRenderer},
        AppError, AppEvent, Application, Engine, EngineError,
    };
}
