//! Key bindings for nudging the car.
//!
//! Hosts translate their own key events into key names and look them up
//! here. The simulation itself only ever sees a [`Direction`].

use serde::{Deserialize, Serialize};

use crate::color::Direction;

/// Two key sets, one per direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub west: Vec<String>,
    pub east: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        // Left hand pushes west, right hand pushes east.
        let keys = |s: &[&str]| s.iter().map(|k| k.to_string()).collect();
        Self {
            west: keys(&["a", "s", "d", "f", "q", "w", "e", "r", "z", "x", "c", "v"]),
            east: keys(&["l", "k", "j", "h", "p", "o", "i", "u", ",", "m", "n", "b"]),
        }
    }
}

impl KeyBindings {
    /// Direction bound to `key`, if any. West wins if a key is in both sets.
    pub fn direction_for(&self, key: &str) -> Option<Direction> {
        if self.west.iter().any(|k| k == key) {
            Some(Direction::West)
        } else if self.east.iter().any(|k| k == key) {
            Some(Direction::East)
        } else {
            None
        }
    }
}
