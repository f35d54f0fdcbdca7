use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{InputSource, Key, Modifier, MouseButton, RawInput};

/// Folds winit `WindowEvent`s into raw levels.
///
/// Feed every window event through [`handle_window_event`](Self::handle_window_event);
/// the runtime then copies the accumulated levels on each poll. Key repeats
/// generated by the OS are ignored, the tracker synthesizes its own.
#[derive(Debug, Clone)]
pub struct WinitInputSource {
    levels: RawInput,
    scale_factor: f64,
}

impl Default for WinitInputSource {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl WinitInputSource {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            levels: RawInput::default(),
            scale_factor,
        }
    }

    pub fn levels(&self) -> &RawInput {
        &self.levels
    }

    /// Applies one window event. Returns `true` if the event was an input event.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.on_key(event.physical_key, event.state, event.repeat);
                true
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.on_mouse_button(*button, *state);
                true
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(*position);
                true
            }

            WindowEvent::CursorLeft { .. } => {
                self.levels.pointer = None;
                true
            }

            WindowEvent::Focused(focused) => {
                if !focused {
                    self.on_focus_lost();
                }
                true
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = *scale_factor;
                false
            }

            _ => false,
        }
    }

    pub fn on_key(&mut self, key: PhysicalKey, state: ElementState, repeat: bool) {
        if repeat {
            return;
        }
        let Some(key) = map_key(key) else {
            log::trace!("untracked key {key:?}");
            return;
        };
        let down = state == ElementState::Pressed;

        // winit does not report lock state; track it from the lock keys themselves.
        if down {
            match key {
                Key::CapsLock => self.levels.locks.toggle(Modifier::CAPS_LOCK),
                Key::NumLock => self.levels.locks.toggle(Modifier::NUM_LOCK),
                _ => {}
            }
        }

        self.levels.set_key(key, down);
    }

    pub fn on_mouse_button(&mut self, button: WinitMouseButton, state: ElementState) {
        if let Some(button) = map_mouse_button(button) {
            self.levels
                .set_button(button, state == ElementState::Pressed);
        }
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        let logical = position.to_logical::<f64>(self.scale_factor);
        self.levels.pointer = Some((logical.x as f32, logical.y as f32));
    }

    /// Releases everything so no control stays stuck while the window is unfocused.
    pub fn on_focus_lost(&mut self) {
        self.levels.release_all();
    }
}

impl InputSource for WinitInputSource {
    fn poll(&mut self, raw: &mut RawInput) {
        raw.clone_from(&self.levels);
    }
}

pub fn map_mouse_button(b: WinitMouseButton) -> Option<MouseButton> {
    Some(match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(5) => MouseButton::Button6,
        WinitMouseButton::Other(6) => MouseButton::Button7,
        WinitMouseButton::Other(7) => MouseButton::Button8,
        WinitMouseButton::Other(_) => return None,
    })
}

pub fn map_key(pk: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = pk else {
        return None;
    };

    let key = match code {
        KeyCode::Space => Key::Space,
        KeyCode::Quote => Key::Apostrophe,
        KeyCode::Comma => Key::Comma,
        KeyCode::Minus => Key::Minus,
        KeyCode::Period => Key::Period,
        KeyCode::Slash => Key::Slash,
        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Equal => Key::Equal,
        KeyCode::BracketLeft => Key::BracketLeft,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::BracketRight => Key::BracketRight,
        KeyCode::Backquote => Key::Grave,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,

        KeyCode::CapsLock => Key::CapsLock,
        KeyCode::ScrollLock => Key::ScrollLock,
        KeyCode::NumLock => Key::NumLock,
        KeyCode::PrintScreen => Key::PrintScreen,
        KeyCode::Pause => Key::Pause,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        KeyCode::Numpad0 => Key::Numpad0,
        KeyCode::Numpad1 => Key::Numpad1,
        KeyCode::Numpad2 => Key::Numpad2,
        KeyCode::Numpad3 => Key::Numpad3,
        KeyCode::Numpad4 => Key::Numpad4,
        KeyCode::Numpad5 => Key::Numpad5,
        KeyCode::Numpad6 => Key::Numpad6,
        KeyCode::Numpad7 => Key::Numpad7,
        KeyCode::Numpad8 => Key::Numpad8,
        KeyCode::Numpad9 => Key::Numpad9,
        KeyCode::NumpadDecimal => Key::NumpadDecimal,
        KeyCode::NumpadDivide => Key::NumpadDivide,
        KeyCode::NumpadMultiply => Key::NumpadMultiply,
        KeyCode::NumpadSubtract => Key::NumpadSubtract,
        KeyCode::NumpadAdd => Key::NumpadAdd,
        KeyCode::NumpadEnter => Key::NumpadEnter,
        KeyCode::NumpadEqual => Key::NumpadEqual,

        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::AltLeft => Key::AltLeft,
        KeyCode::SuperLeft => Key::SuperLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::ControlRight => Key::ControlRight,
        KeyCode::AltRight => Key::AltRight,
        KeyCode::SuperRight => Key::SuperRight,
        KeyCode::ContextMenu => Key::Menu,

        _ => return None,
    };
    Some(key)
}
