use std::time::Duration;

use crate::error::ConfigError;

use super::frame::InputFrame;
use super::modifiers::ModifierSet;
use super::policy::InputPolicy;
use super::raw::RawInput;
use super::signal::InputSignal;
use super::types::{Control, InputEvent, InputEventKind, Key, MouseButton};

/// Turns raw levels into semantic input events.
///
/// One signal record exists for every enumerable key and button for the whole run.
/// Owning thread only: other threads reach the tracker through the `Delegator`.
#[derive(Debug)]
pub struct InputTracker {
    policy: InputPolicy,
    keys: Vec<InputSignal>,
    buttons: Vec<InputSignal>,
    modifiers: ModifierSet,
    pointer: Option<(f32, f32)>,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new(InputPolicy::default())
    }
}

impl InputTracker {
    pub fn new(policy: InputPolicy) -> Self {
        Self {
            policy,
            keys: vec![InputSignal::default(); Key::COUNT],
            buttons: vec![InputSignal::default(); MouseButton::COUNT],
            modifiers: ModifierSet::default(),
            pointer: None,
        }
    }

    /// Samples every control once and writes the resulting events to `frame`.
    pub fn update(&mut self, raw: &RawInput, now: u64, frame: &mut InputFrame) {
        for &key in Key::ALL {
            let signal = &mut self.keys[key.index()];
            if let Some(kind) = signal.step(raw.key(key), now, &self.policy) {
                frame.push_event(InputEvent {
                    control: Control::Key(key),
                    kind,
                    time_ns: now,
                    pointer: None,
                });
            }
        }

        let moved = match (self.pointer, raw.pointer) {
            (Some((px, py)), Some((x, y))) => Some((x - px, y - py)).filter(|d| *d != (0.0, 0.0)),
            _ => None,
        };

        for &button in MouseButton::ALL {
            let signal = &mut self.buttons[button.index()];
            let control = Control::Button(button);
            let event = |kind| InputEvent {
                control,
                kind,
                time_ns: now,
                pointer: raw.pointer,
            };

            let was_down = signal.is_down();
            match signal.step(raw.button(button), now, &self.policy) {
                Some(kind @ InputEventKind::Down { .. }) => {
                    signal.set_down_position(raw.pointer);
                    frame.push_event(event(kind));
                }
                Some(kind) => frame.push_event(event(kind)),
                None => {}
            }

            // Motion before the press belongs to no drag.
            if was_down && signal.is_down() {
                if let (Some(delta), Some(start)) = (moved, signal.down_position()) {
                    frame.push_event(event(InputEventKind::Dragged { start, delta }));
                }
            }
        }

        self.pointer = raw.pointer;
        self.modifiers = ModifierSet::from_keys(raw.keys_down(), raw.locks);

        frame.modifiers = self.modifiers;
        frame.pointer = self.pointer;
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn signal(&self, control: impl Into<Control>) -> &InputSignal {
        match control.into() {
            Control::Key(k) => &self.keys[k.index()],
            Control::Button(b) => &self.buttons[b.index()],
        }
    }

    pub fn is_down(&self, control: impl Into<Control>) -> bool {
        self.signal(control).is_down()
    }

    pub fn is_held(&self, control: impl Into<Control>) -> bool {
        self.signal(control).is_held()
    }

    pub fn down_count(&self, control: impl Into<Control>) -> u32 {
        self.signal(control).down_count()
    }

    pub fn down_position(&self, button: MouseButton) -> Option<(f32, f32)> {
        self.signal(button).down_position()
    }

    pub fn modifiers(&self) -> ModifierSet {
        self.modifiers
    }

    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    // ── policy ────────────────────────────────────────────────────────────

    pub fn policy(&self) -> &InputPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: InputPolicy) -> Result<(), ConfigError> {
        policy.validate()?;
        self.policy = policy;
        Ok(())
    }

    pub fn set_hold_frequency(&mut self, seconds: f64) -> Result<(), ConfigError> {
        self.policy.set_hold_frequency(seconds)
    }

    pub fn set_double_press_delay(&mut self, seconds: f64) -> Result<(), ConfigError> {
        self.policy.set_double_press_delay(seconds)
    }

    /// Gives `control` its own policy instead of the tracker-wide one.
    pub fn set_control_policy(
        &mut self,
        control: impl Into<Control>,
        policy: InputPolicy,
    ) -> Result<(), ConfigError> {
        policy.validate()?;
        self.signal_mut(control.into()).set_policy(Some(policy));
        Ok(())
    }

    pub fn clear_control_policy(&mut self, control: impl Into<Control>) {
        self.signal_mut(control.into()).set_policy(None);
    }

    /// Sets the held threshold of `control`, keeping the rest of its effective policy.
    pub fn arm_held(&mut self, control: impl Into<Control>, threshold: Duration) {
        let control = control.into();
        let base = self.signal(control).policy().copied().unwrap_or(self.policy);
        self.signal_mut(control)
            .set_policy(Some(base.with_held_threshold(threshold)));
    }

    /// Session teardown: every control returns to unknown and loses its own policy.
    pub fn reset(&mut self) {
        self.keys.iter_mut().chain(self.buttons.iter_mut()).for_each(InputSignal::reset);
        self.modifiers = ModifierSet::default();
        self.pointer = None;
    }

    fn signal_mut(&mut self, control: Control) -> &mut InputSignal {
        match control {
            Control::Key(k) => &mut self.keys[k.index()],
            Control::Button(b) => &mut self.buttons[b.index()],
        }
    }
}
