use std::collections::BTreeMap;

use crate::Action;

/// Keyboard shortcuts, keyed by the lowercase character a key produces.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    keys: BTreeMap<char, Action>,
}

impl Default for KeyBindings {
    /// `W` toggles walking, `Space` jumps.
    fn default() -> Self {
        let mut keys = BTreeMap::new();
        keys.insert('w', Action::ToggleWalk);
        keys.insert(' ', Action::Jump);
        Self { keys }
    }
}

impl KeyBindings {
    pub fn bind(&mut self, key: char, action: Action) {
        self.keys.insert(key.to_ascii_lowercase(), action);
    }

    /// Action for `key`; unbound keys map to `Action::Noop`.
    pub fn resolve(&self, key: char) -> Action {
        self.keys
            .get(&key.to_ascii_lowercase())
            .copied()
            .unwrap_or(Action::Noop)
    }

    /// Resolve the text a key press produced (first character only).
    pub fn resolve_text(&self, text: &str) -> Action {
        text.chars().next().map_or(Action::Noop, |c| self.resolve(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_walk_and_jump() {
        let b = KeyBindings::default();
        assert_eq!(b.resolve('w'), Action::ToggleWalk);
        assert_eq!(b.resolve('W'), Action::ToggleWalk);
        assert_eq!(b.resolve(' '), Action::Jump);
        assert_eq!(b.resolve('x'), Action::Noop);
    }

    #[test]
    fn rebinding_replaces() {
        let mut b = KeyBindings::default();
        b.bind('J', Action::Jump);
        assert_eq!(b.resolve_text("j"), Action::Jump);
        assert_eq!(b.resolve_text(""), Action::Noop);
    }
}
