use super::modifiers::ModifierSet;
use super::types::{Control, InputEvent, InputEventKind};

/// Per-frame input deltas.
///
/// `InputTracker` provides the current state (down/held controls, counts, pointer).
/// `InputFrame` provides the semantic events produced by the current tick.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Events in emission order: keys first, then buttons.
    pub events: Vec<InputEvent>,

    /// Modifiers active during this tick.
    pub modifiers: ModifierSet,

    /// Pointer position in logical pixels.
    pub pointer: Option<(f32, f32)>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.modifiers = ModifierSet::default();
        self.pointer = None;
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    /// Events for a single control.
    pub fn events_for(&self, control: impl Into<Control>) -> impl Iterator<Item = &InputEvent> {
        let control = control.into();
        self.events.iter().filter(move |e| e.control == control)
    }

    /// Down count if `control` was pressed this frame.
    pub fn down_count(&self, control: impl Into<Control>) -> Option<u32> {
        self.events_for(control).find_map(InputEvent::down_count)
    }

    pub fn pressed(&self, control: impl Into<Control>) -> bool {
        self.down_count(control).is_some()
    }

    pub fn released(&self, control: impl Into<Control>) -> bool {
        self.events_for(control).any(|e| e.kind == InputEventKind::Up)
    }

    pub fn held(&self, control: impl Into<Control>) -> bool {
        self.events_for(control).any(|e| e.kind == InputEventKind::Held)
    }

    pub fn repeated(&self, control: impl Into<Control>) -> bool {
        self.events_for(control).any(|e| e.kind == InputEventKind::Repeated)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
