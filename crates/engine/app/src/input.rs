//! Input snapshots
//!
//! The runner folds window events into an [`InputState`] as they arrive and
//! keeps the previous frame's snapshot. The update phase only sees the pair,
//! so edge detection is a comparison rather than hidden per-key state.

use glam::Vec2;
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Input at one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub keys: HashSet<KeyCode>,
    /// Cursor position in window pixels; `None` while outside the window
    pub cursor: Option<Vec2>,
    pub left_button: bool,
    pub right_button: bool,
}

impl InputState {
    /// Forget everything, e.g. when the window loses focus
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Current and previous snapshots handed to the update phase
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub current: &'a InputState,
    pub previous: &'a InputState,
}

impl<'a> FrameInput<'a> {
    pub fn new(current: &'a InputState, previous: &'a InputState) -> Self {
        Self { current, previous }
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.current.keys.contains(&key)
    }

    /// Held last frame and released now; fires once per press
    pub fn key_pressed_once(&self, key: KeyCode) -> bool {
        self.previous.keys.contains(&key) && !self.current.keys.contains(&key)
    }

    pub fn left_button(&self) -> bool {
        self.current.left_button
    }

    pub fn right_button(&self) -> bool {
        self.current.right_button
    }

    /// Cursor movement since the previous frame
    ///
    /// Zero unless the cursor is inside the window now and had a valid
    /// (strictly positive) position last frame.
    pub fn cursor_displacement(&self) -> Vec2 {
        match (self.previous.cursor, self.current.cursor) {
            (Some(prev), Some(cur)) if prev.x > 0.0 && prev.y > 0.0 => cur - prev,
            _ => Vec2::ZERO,
        }
    }
}
