//! Entity-Component implementation
//!
//! Entities own a transform, an optional physics body and an ordered list of
//! components. Components carry behavior through lifecycle hooks that the
//! engine calls from its two loop clocks.

pub mod commands;
pub mod component;
pub mod components;
pub mod context;
pub mod entity;
pub mod timers;
pub mod world;

pub use commands::{Command, CommandQueue};
pub use component::{AsAny, Component, ComponentError, ComponentId, ComponentKind};
pub use components::{MeshComponent, Transform};
pub use context::Context;
pub use entity::{Entity, EntityId};
pub use timers::{Cooldown, TimerEntry, TimerId, TimerTable, TimerTag};
pub use world::World;
