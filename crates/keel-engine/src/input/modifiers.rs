use bitflags::bitflags;

use super::types::Key;

bitflags! {
    /// Modifier controls. Bit values match the GLFW modifier mask.
    #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
    pub struct Modifier: u8 {
        const SHIFT = 0x01;
        const CONTROL = 0x02;
        const ALT = 0x04;
        const SUPER = 0x08;
        const CAPS_LOCK = 0x10;
        const NUM_LOCK = 0x20;
    }
}

impl Modifier {
    /// Modifier driven by holding `key`, if any.
    ///
    /// Lock keys toggle rather than hold, so their state is reported separately.
    pub fn for_key(key: Key) -> Option<Modifier> {
        match key {
            Key::ShiftLeft | Key::ShiftRight => Some(Modifier::SHIFT),
            Key::ControlLeft | Key::ControlRight => Some(Modifier::CONTROL),
            Key::AltLeft | Key::AltRight => Some(Modifier::ALT),
            Key::SuperLeft | Key::SuperRight => Some(Modifier::SUPER),
            _ => None,
        }
    }
}

/// Snapshot of the modifiers active during one tick.
///
/// An empty query follows the zero-argument convention: `any(Modifier::empty())` asks
/// whether anything is active, `all`/`only` with an empty query ask whether nothing is.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ModifierSet {
    active: Modifier,
}

impl ModifierSet {
    pub const fn new(active: Modifier) -> Self {
        Self { active }
    }

    /// Builds a snapshot from held keys plus the current lock state.
    pub fn from_keys<I>(down: I, locks: Modifier) -> Self
    where
        I: IntoIterator<Item = Key>,
    {
        let held = down
            .into_iter()
            .filter_map(Modifier::for_key)
            .fold(Modifier::empty(), |acc, m| acc | m);
        let locks = locks & (Modifier::CAPS_LOCK | Modifier::NUM_LOCK);
        Self::new(held | locks)
    }

    pub fn active(&self) -> Modifier {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn any(&self, query: Modifier) -> bool {
        if query.is_empty() {
            return !self.active.is_empty();
        }
        self.active.intersects(query)
    }

    pub fn all(&self, query: Modifier) -> bool {
        if query.is_empty() {
            return self.active.is_empty();
        }
        self.active.contains(query)
    }

    pub fn only(&self, query: Modifier) -> bool {
        self.active == query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_conventions() {
        let set = ModifierSet::default();
        assert!(set.only(Modifier::empty()));
        assert!(set.all(Modifier::empty()));
        assert!(!set.any(Modifier::empty()));
    }

    #[test]
    fn shift_only() {
        let set = ModifierSet::new(Modifier::SHIFT);
        assert!(!set.only(Modifier::empty()));
        assert!(set.only(Modifier::SHIFT));
        assert!(set.any(Modifier::empty()));
        assert!(!set.all(Modifier::SHIFT | Modifier::CONTROL));
        assert!(!set.all(Modifier::empty()));
    }

    #[test]
    fn any_and_all_with_several_active() {
        let set = ModifierSet::new(Modifier::SHIFT | Modifier::ALT);
        assert!(set.any(Modifier::ALT | Modifier::SUPER));
        assert!(!set.any(Modifier::SUPER));
        assert!(set.all(Modifier::SHIFT | Modifier::ALT));
        assert!(!set.only(Modifier::SHIFT));
    }

    #[test]
    fn built_from_keys_and_locks() {
        let set = ModifierSet::from_keys(
            [Key::ShiftRight, Key::A, Key::ControlLeft],
            Modifier::CAPS_LOCK | Modifier::SHIFT,
        );
        assert!(set.only(Modifier::SHIFT | Modifier::CONTROL | Modifier::CAPS_LOCK));
    }
}
