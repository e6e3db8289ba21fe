//! Input management system
//!
//! The host feeds window events into the [`InputManager`]; components read
//! the resulting state through their context. Per-frame state (presses and
//! accumulated mouse motion) is cleared by [`InputManager::end_frame`].

use std::collections::HashSet;

/// Input manager
#[derive(Debug, Default, Clone)]
pub struct InputManager {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
    mouse_position: (f64, f64),
    mouse_delta: (f64, f64),
    mouse_moved: bool,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state after a variable tick
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.mouse_delta = (0.0, 0.0);
        self.mouse_moved = false;
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.buttons_down.insert(button) {
                self.buttons_pressed.insert(button);
            }
        } else if self.buttons_down.remove(&button) {
            self.buttons_released.insert(button);
        }
    }

    /// Handle absolute mouse movement
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        let (last_x, last_y) = self.mouse_position;
        self.handle_mouse_motion(x - last_x, y - last_y);
        self.mouse_position = (x, y);
    }

    /// Handle relative mouse movement (pointer lock)
    pub fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
        self.mouse_moved = true;
    }

    /// Key is held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Key went down this frame
    pub fn was_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Mouse button is held
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Mouse button went down this frame
    pub fn was_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// Mouse button went up this frame
    pub fn was_button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    /// Mouse motion accumulated this frame
    pub fn mouse_delta(&self) -> (f32, f32) {
        (self.mouse_delta.0 as f32, self.mouse_delta.1 as f32)
    }

    /// Whether the mouse moved this frame
    pub fn mouse_moved(&self) -> bool {
        self.mouse_moved
    }

    /// Last absolute mouse position
    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse_position
    }

    /// -1, 0 or 1 depending on which of the two keys is held
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.is_key_down(negative) {
            value -= 1.0;
        }
        if self.is_key_down(positive) {
            value += 1.0;
        }
        value
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// E key
    E,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// W key
    W,
    /// Space key
    Space,
    /// Left control
    Control,
    /// Left shift
    Shift,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}
