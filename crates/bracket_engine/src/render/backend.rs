//! Render backend abstraction
//!
//! The engine does not draw anything itself. Once per variable tick it hands
//! a [`FrameSnapshot`] to whatever backend the host installed.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::render::FrameSnapshot;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// The backend rejected the frame
    #[error("Frame submission failed: {0}")]
    SubmitFailed(String),

    /// The output surface is gone (window closed, device lost)
    #[error("Surface lost")]
    SurfaceLost,
}

/// Receiver of per-frame snapshots
pub trait RenderBackend {
    /// Current viewport size in pixels (width, height)
    fn viewport(&self) -> (u32, u32) {
        (1280, 720)
    }

    /// Present one frame
    fn submit(&mut self, frame: &FrameSnapshot) -> Result<(), RenderError>;
}

/// Backend that discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl RenderBackend for NullRenderer {
    fn submit(&mut self, _frame: &FrameSnapshot) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Backend that keeps the most recent frames for inspection
///
/// Clones share the same frame buffer, so a test or a headless host can keep
/// a handle while the engine owns the backend.
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<FrameSnapshot>>>,
    capacity: usize,
    viewport: (u32, u32),
}

impl RecordingRenderer {
    /// Keep at most `capacity` frames (oldest are dropped first)
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Arc::new(Mutex::new(Vec::new())),
            capacity: capacity.max(1),
            viewport: (1280, 720),
        }
    }

    /// Report a different viewport size
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }

    /// Number of frames currently held
    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Most recent frame
    pub fn last_frame(&self) -> Option<FrameSnapshot> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Remove and return every held frame
    pub fn take_frames(&self) -> Vec<FrameSnapshot> {
        std::mem::take(&mut *self.frames.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new(120)
    }
}

impl RenderBackend for RecordingRenderer {
    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn submit(&mut self, frame: &FrameSnapshot) -> Result<(), RenderError> {
        let mut frames = self.frames.lock().unwrap_or_else(PoisonError::into_inner);
        if frames.len() >= self.capacity {
            let excess = frames.len() + 1 - self.capacity;
            frames.drain(..excess);
        }
        frames.push(frame.clone());
        Ok(())
    }
}
