//! Raw key state to directional intent
//!
//! The host's input system owns key capture; it only reports presses and
//! releases here. Arrow keys and WASD alias to the same four controls.

use serde::{Deserialize, Serialize};

/// Logical controls the simulation understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Left,
    Right,
    Forward,
    Brake,
}

impl Control {
    /// Map a host key name (DOM `key` or `code` style) to a control
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" | "KeyA" => Some(Control::Left),
            "ArrowRight" | "d" | "D" | "KeyD" => Some(Control::Right),
            "ArrowUp" | "w" | "W" | "KeyW" => Some(Control::Forward),
            "ArrowDown" | "s" | "S" | "KeyS" => Some(Control::Brake),
            _ => None,
        }
    }
}

/// Directional intent for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub brake: bool,
}

impl Intent {
    /// Lateral direction: -1 left, +1 right, 0 for neither or both
    pub fn lateral(&self) -> i8 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// Braking only counts when forward isn't also held
    pub fn braking(&self) -> bool {
        self.brake && !self.forward
    }
}

/// Pressed flags per control, maintained by the input collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    left: bool,
    right: bool,
    forward: bool,
    brake: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press; returns false for keys that map to nothing
    pub fn press(&mut self, key: &str) -> bool {
        match Control::from_key(key) {
            Some(control) => {
                self.set(control, true);
                true
            }
            None => false,
        }
    }

    /// Record a key release; returns false for keys that map to nothing
    pub fn release(&mut self, key: &str) -> bool {
        match Control::from_key(key) {
            Some(control) => {
                self.set(control, false);
                true
            }
            None => false,
        }
    }

    pub fn set(&mut self, control: Control, pressed: bool) {
        let flag = match control {
            Control::Left => &mut self.left,
            Control::Right => &mut self.right,
            Control::Forward => &mut self.forward,
            Control::Brake => &mut self.brake,
        };
        *flag = pressed;
    }

    pub fn is_pressed(&self, control: Control) -> bool {
        match control {
            Control::Left => self.left,
            Control::Right => self.right,
            Control::Forward => self.forward,
            Control::Brake => self.brake,
        }
    }

    /// Release everything (focus loss, restart)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Snapshot the flags as this tick's intent
    pub fn intent(&self) -> Intent {
        Intent {
            left: self.left,
            right: self.right,
            forward: self.forward,
            brake: self.brake,
        }
    }
}
