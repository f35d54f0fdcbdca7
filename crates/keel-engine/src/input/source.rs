use super::modifiers::Modifier;
use super::raw::RawInput;
use super::types::Control;

/// Supplies raw levels to the owning loop.
///
/// `poll` is called once per admitted frame, on the owning thread, before the tracker
/// runs. Implementations overwrite whatever part of `raw` they know about.
pub trait InputSource {
    fn poll(&mut self, raw: &mut RawInput);
}

impl<F> InputSource for F
where
    F: FnMut(&mut RawInput),
{
    fn poll(&mut self, raw: &mut RawInput) {
        self(raw)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Change {
    Level(Control, bool),
    Pointer(Option<(f32, f32)>),
    Locks(Modifier),
}

/// Replays a fixed timeline of level changes, indexed by poll count.
///
/// Poll `n` (0-based) applies every change scheduled at tick `n` or earlier
/// that has not been applied yet.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    changes: Vec<(u64, Change)>,
    cursor: usize,
    tick: u64,
    sorted: bool,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(self, tick: u64, control: impl Into<Control>) -> Self {
        self.at(tick, Change::Level(control.into(), true))
    }

    pub fn release(self, tick: u64, control: impl Into<Control>) -> Self {
        self.at(tick, Change::Level(control.into(), false))
    }

    /// Press at `tick`, release `length` ticks later.
    pub fn tap(self, tick: u64, length: u64, control: impl Into<Control>) -> Self {
        let control = control.into();
        self.press(tick, control).release(tick + length.max(1), control)
    }

    pub fn pointer(self, tick: u64, x: f32, y: f32) -> Self {
        self.at(tick, Change::Pointer(Some((x, y))))
    }

    pub fn pointer_left(self, tick: u64) -> Self {
        self.at(tick, Change::Pointer(None))
    }

    pub fn locks(self, tick: u64, locks: Modifier) -> Self {
        self.at(tick, Change::Locks(locks))
    }

    /// Number of polls so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.changes.len()
    }

    fn at(mut self, tick: u64, change: Change) -> Self {
        self.changes.push((tick, change));
        self.sorted = false;
        self
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, raw: &mut RawInput) {
        if !self.sorted {
            // Stable, so same-tick changes keep their declaration order.
            self.changes[self.cursor..].sort_by_key(|(tick, _)| *tick);
            self.sorted = true;
        }

        while let Some((tick, change)) = self.changes.get(self.cursor) {
            if *tick > self.tick {
                break;
            }
            match change {
                Change::Level(control, down) => raw.set_level(*control, *down),
                Change::Pointer(p) => raw.pointer = *p,
                Change::Locks(l) => raw.locks = *l,
            }
            self.cursor += 1;
        }

        self.tick += 1;
    }
}
