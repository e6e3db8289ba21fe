//! Component trait and lifecycle hooks
//!
//! A component is a behavior unit owned by exactly one entity. Every hook is
//! optional: the defaults do nothing, so a component only implements what it
//! needs. Hooks receive a [`Context`] through which they reach their entity,
//! the physics world, timers and the rest of the engine.

use std::any::Any;

use thiserror::Error;

use crate::ecs::{Context, EntityId, TimerTag, Transform};
use crate::render::FrameSnapshot;

slotmap::new_key_type! {
    /// Identifier of a component attached to a live entity
    pub struct ComponentId;
}

/// Tag used to look components up by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Renders a mesh at the entity transform
    Mesh,
    /// Fly camera controls
    CameraControls,
    /// Rigid-body player controls
    PlayerControls,
    /// Weapon script
    Weapon,
    /// Temporary marker entity
    HitMarker,
    /// Application-defined component
    Custom(&'static str),
}

/// Errors a component may report from `start`
#[derive(Error, Debug)]
pub enum ComponentError {
    /// A required asset could not be loaded
    #[error("Missing asset: {0}")]
    MissingAsset(String),

    /// The component needs a physics body on its entity
    #[error("Entity has no physics body")]
    MissingBody,

    /// The component needs the engine camera
    #[error("No camera has been set")]
    MissingCamera,

    /// Any other start failure
    #[error("{0}")]
    Failed(String),
}

/// Upcast helper so concrete components can be reached from trait objects
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior unit attached to an entity
pub trait Component: AsAny {
    /// Kind tag used by `get_component`
    fn kind(&self) -> ComponentKind;

    /// Called once when the component becomes live
    ///
    /// An error is logged by the engine; the component stays attached.
    fn start(&mut self, _ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called every variable tick with the elapsed time in seconds
    fn update(&mut self, _ctx: &mut Context<'_>, _dt: f32) {}

    /// Called every fixed tick, before the physics step
    fn fixed_update(&mut self, _ctx: &mut Context<'_>) {}

    /// Called when the entity is destroyed
    fn on_destroy(&mut self, _ctx: &mut Context<'_>) {}

    /// Called when a timer scheduled by this component expires
    fn on_timer(&mut self, _ctx: &mut Context<'_>, _tag: TimerTag) {}

    /// Add whatever this component draws to the frame
    fn contribute(&self, _entity: EntityId, _transform: &Transform, _frame: &mut FrameSnapshot) {}
}

impl dyn Component {
    /// Borrow as a concrete component type
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow as a concrete component type
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
