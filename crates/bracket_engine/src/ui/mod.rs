//! UI module
//!
//! Only text overlays are supported: the [`Hud`] holds named text sinks that
//! are copied into every frame snapshot.

pub mod hud;

pub use hud::Hud;
