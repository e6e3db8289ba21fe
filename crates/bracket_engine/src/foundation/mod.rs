//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and Euler/quaternion conversion
//! - Time sources and frame timing
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
