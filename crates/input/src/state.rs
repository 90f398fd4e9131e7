use glam::DVec2;
use std::collections::HashSet;

/// Keys the scene reacts to. Hosts map their native key codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Escape,
}

/// Input snapshot for one tick.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys_held: HashSet<Key>,
    cursor: DVec2,
    close_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        if self.keys_held.insert(key) {
            tracing::trace!(?key, "key pressed");
        }
    }

    pub fn release(&mut self, key: Key) {
        self.keys_held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    /// Cursor position in window pixels.
    pub fn cursor(&self) -> DVec2 {
        self.cursor
    }

    pub fn set_cursor(&mut self, position: DVec2) {
        self.cursor = position;
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// True when the window was asked to close or Escape is held.
    pub fn wants_exit(&self) -> bool {
        self.close_requested || self.is_held(Key::Escape)
    }
}
