//! Deferred structural changes
//!
//! Hooks cannot add or remove entities and components while the world is
//! iterating them. They queue a [`Command`] instead, and the world applies
//! the queue at the end of each tick.

use std::collections::VecDeque;

use crate::ecs::{Component, ComponentId, EntityId};

/// A structural change requested from inside a hook
pub enum Command {
    /// Make an already inserted, not yet live entity live
    Spawn(EntityId),
    /// Destroy an entity
    Destroy(EntityId),
    /// Attach a component to an entity
    AddComponent(EntityId, Box<dyn Component>),
    /// Detach a component from an entity
    RemoveComponent(EntityId, ComponentId),
    /// Stop both loop clocks
    Stop,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(id) => f.debug_tuple("Spawn").field(id).finish(),
            Self::Destroy(id) => f.debug_tuple("Destroy").field(id).finish(),
            Self::AddComponent(id, component) => {
                f.debug_tuple("AddComponent").field(id).field(&component.kind()).finish()
            }
            Self::RemoveComponent(id, component) => {
                f.debug_tuple("RemoveComponent").field(id).field(component).finish()
            }
            Self::Stop => f.write_str("Stop"),
        }
    }
}

/// FIFO of pending commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    queue: VecDeque<Command>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command
    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Take the oldest command
    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
