//! Entity implementation
//!
//! An [`Entity`] is assembled detached from the engine: a name, a transform,
//! an optional body description and a list of components. Handing it to the
//! engine makes it live and returns its [`EntityId`].

use crate::ecs::{Component, Transform};
use crate::foundation::math::Vec3;
use crate::physics::BodyDesc;

slotmap::new_key_type! {
    /// Entity identifier, stale once the entity is destroyed
    pub struct EntityId;
}

/// Detached entity under construction
pub struct Entity {
    pub(crate) name: String,
    pub(crate) transform: Transform,
    pub(crate) components: Vec<Box<dyn Component>>,
    pub(crate) body: Option<BodyDesc>,
}

impl Entity {
    /// Create an unnamed entity at the origin
    pub fn new() -> Self {
        Self::named("entity")
    }

    /// Create a named entity at the origin
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            components: Vec::new(),
            body: None,
        }
    }

    /// Entity name, used in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Set position
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Set rotation (Euler angles in radians)
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
    }

    /// Set scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// Builder pattern: Set rotation
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Attach a physics body, created at the entity pose when it goes live
    pub fn set_body(&mut self, body: BodyDesc) {
        self.body = Some(body);
    }

    /// Builder pattern: Attach a physics body
    pub fn with_body(mut self, body: BodyDesc) -> Self {
        self.set_body(body);
        self
    }

    /// Append a component; nothing runs until the entity is live
    pub fn add_component<C: Component>(&mut self, component: C) {
        self.components.push(Box::new(component));
    }

    /// Append an already boxed component
    pub fn add_boxed_component(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    /// Builder pattern: Append a component
    pub fn with_component<C: Component>(mut self, component: C) -> Self {
        self.add_component(component);
        self
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Whether a body will be created for this entity
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("components", &self.components.len())
            .field("body", &self.body.is_some())
            .finish()
    }
}
