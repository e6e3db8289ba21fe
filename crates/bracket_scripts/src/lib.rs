//! Gameplay scripts for bracket_engine
//!
//! Each script is an ordinary [`Component`](bracket_engine::ecs::Component):
//! it only talks to the engine through lifecycle hooks, its
//! [`Context`](bracket_engine::ecs::Context) and the raycast facade.
//!
//! - [`CameraControls`]: free-fly camera
//! - [`PlayerControls`]: body-driven first-person movement with jumping
//! - [`Weapon`]: hitscan gun with recoil, reload and an ammo readout
//! - [`HitMarker`]: marker that removes itself after a second

pub mod camera_controls;
pub mod hit_marker;
pub mod look;
pub mod player_controls;
pub mod weapon;

pub use camera_controls::CameraControls;
pub use hit_marker::HitMarker;
pub use look::MouseLook;
pub use player_controls::PlayerControls;
pub use weapon::{Weapon, WeaponConfig, GUNINFO_SINK};
