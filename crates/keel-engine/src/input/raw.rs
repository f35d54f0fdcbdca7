use super::modifiers::Modifier;
use super::types::{Control, Key, MouseButton};

/// Latest hardware levels, as supplied by a platform layer once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInput {
    keys: [bool; Key::COUNT],
    buttons: [bool; MouseButton::COUNT],

    /// Pointer position in logical pixels; `None` while outside the surface.
    pub pointer: Option<(f32, f32)>,

    /// Toggle state of the lock modifiers. Other bits are ignored.
    pub locks: Modifier,
}

impl Default for RawInput {
    fn default() -> Self {
        Self {
            keys: [false; Key::COUNT],
            buttons: [false; MouseButton::COUNT],
            pointer: None,
            locks: Modifier::empty(),
        }
    }
}

impl RawInput {
    pub fn key(&self, key: Key) -> bool {
        self.keys[key.index()]
    }

    pub fn set_key(&mut self, key: Key, down: bool) {
        self.keys[key.index()] = down;
    }

    pub fn button(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn set_button(&mut self, button: MouseButton, down: bool) {
        self.buttons[button.index()] = down;
    }

    pub fn level(&self, control: Control) -> bool {
        match control {
            Control::Key(k) => self.key(k),
            Control::Button(b) => self.button(b),
        }
    }

    pub fn set_level(&mut self, control: Control, down: bool) {
        match control {
            Control::Key(k) => self.set_key(k, down),
            Control::Button(b) => self.set_button(b, down),
        }
    }

    /// Keys currently reported down.
    pub fn keys_down(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.iter().copied().filter(|k| self.key(*k))
    }

    /// Releases every key and button. Pointer and lock state are kept.
    pub fn release_all(&mut self) {
        self.keys = [false; Key::COUNT];
        self.buttons = [false; MouseButton::COUNT];
    }
}
