//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::input::{KeyCode, MouseButton};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to build a scene and drive it with [`Engine::run`].
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the clocks start. Use this to set the camera and
    /// add the initial entities.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Per-frame hook
    ///
    /// Called on every variable tick, after the frame has been submitted.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since the previous variable tick in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Handle host events
    ///
    /// The default forwards to the engine, which feeds input and reacts to
    /// window events.
    fn handle_event(&mut self, engine: &mut Engine, event: AppEvent) {
        engine.handle_event(event);
    }

    /// Cleanup the application
    ///
    /// Called once after the clocks stop.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(String),
}

/// Events a host forwards to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// Window was resized
    WindowResized {
        /// New window width
        width: u32,
        /// New window height
        height: u32,
    },

    /// Window close requested
    WindowCloseRequested,

    /// Key input event
    KeyInput {
        /// The key that was pressed/released
        key: KeyCode,
        /// Whether the key was pressed (true) or released (false)
        pressed: bool,
    },

    /// Mouse button event
    MouseButton {
        /// The mouse button that was pressed/released
        button: MouseButton,
        /// Whether the button was pressed (true) or released (false)
        pressed: bool,
    },

    /// Cursor moved to a window position
    MouseMoved {
        /// New X coordinate
        x: f64,
        /// New Y coordinate
        y: f64,
    },

    /// Raw relative mouse motion, as reported with a captured cursor
    MouseMotion {
        /// Horizontal motion
        dx: f64,
        /// Vertical motion
        dy: f64,
    },
}
