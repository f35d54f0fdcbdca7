use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Declares a field-less control enum together with its code table.
///
/// Codes follow the GLFW numbering so they stay stable across platforms.
macro_rules! controls {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $code:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const COUNT: usize = Self::ALL.len();

            /// Dense index into per-control storage.
            pub const fn index(self) -> usize {
                self as usize
            }

            /// Native code for this control.
            pub const fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Reverse lookup of `code`. The table is built on first use.
            pub fn from_code(code: i32) -> Option<Self> {
                static TABLE: OnceLock<HashMap<i32, $name>> = OnceLock::new();
                TABLE
                    .get_or_init(|| Self::ALL.iter().map(|c| (c.code(), *c)).collect())
                    .get(&code)
                    .copied()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:?}", self)
            }
        }
    };
}

controls! {
    /// Keyboard key identifier.
    ///
    /// Platform layers map their key codes into these variants; keys without a
    /// variant are not tracked.
    pub enum Key {
        Space = 32,
        Apostrophe = 39,
        Comma = 44,
        Minus = 45,
        Period = 46,
        Slash = 47,

        Digit0 = 48, Digit1 = 49, Digit2 = 50, Digit3 = 51, Digit4 = 52,
        Digit5 = 53, Digit6 = 54, Digit7 = 55, Digit8 = 56, Digit9 = 57,

        Semicolon = 59,
        Equal = 61,

        A = 65, B = 66, C = 67, D = 68, E = 69, F = 70, G = 71, H = 72, I = 73,
        J = 74, K = 75, L = 76, M = 77, N = 78, O = 79, P = 80, Q = 81, R = 82,
        S = 83, T = 84, U = 85, V = 86, W = 87, X = 88, Y = 89, Z = 90,

        BracketLeft = 91,
        Backslash = 92,
        BracketRight = 93,
        Grave = 96,

        Escape = 256,
        Enter = 257,
        Tab = 258,
        Backspace = 259,
        Insert = 260,
        Delete = 261,
        ArrowRight = 262,
        ArrowLeft = 263,
        ArrowDown = 264,
        ArrowUp = 265,
        PageUp = 266,
        PageDown = 267,
        Home = 268,
        End = 269,

        CapsLock = 280,
        ScrollLock = 281,
        NumLock = 282,
        PrintScreen = 283,
        Pause = 284,

        F1 = 290, F2 = 291, F3 = 292, F4 = 293, F5 = 294, F6 = 295,
        F7 = 296, F8 = 297, F9 = 298, F10 = 299, F11 = 300, F12 = 301,

        Numpad0 = 320, Numpad1 = 321, Numpad2 = 322, Numpad3 = 323, Numpad4 = 324,
        Numpad5 = 325, Numpad6 = 326, Numpad7 = 327, Numpad8 = 328, Numpad9 = 329,
        NumpadDecimal = 330,
        NumpadDivide = 331,
        NumpadMultiply = 332,
        NumpadSubtract = 333,
        NumpadAdd = 334,
        NumpadEnter = 335,
        NumpadEqual = 336,

        ShiftLeft = 340,
        ControlLeft = 341,
        AltLeft = 342,
        SuperLeft = 343,
        ShiftRight = 344,
        ControlRight = 345,
        AltRight = 346,
        SuperRight = 347,
        Menu = 348,
    }
}

controls! {
    /// Mouse button identifier.
    pub enum MouseButton {
        Left = 0,
        Right = 1,
        Middle = 2,
        Back = 3,
        Forward = 4,
        Button6 = 5,
        Button7 = 6,
        Button8 = 7,
    }
}

/// Any tracked physical control.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Control {
    Key(Key),
    Button(MouseButton),
}

impl From<Key> for Control {
    fn from(key: Key) -> Self {
        Control::Key(key)
    }
}

impl From<MouseButton> for Control {
    fn from(button: MouseButton) -> Self {
        Control::Button(button)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Key(k) => write!(f, "key {k}"),
            Control::Button(b) => write!(f, "button {b}"),
        }
    }
}

/// Semantic transition emitted by the input tracker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEventKind {
    /// Fresh press. `down_count` is 2 for a double press, 3 for a triple press, and so on.
    Down { down_count: u32 },

    /// Down long enough to pass the control's held threshold. Emitted once per press.
    Held,

    /// Still held; emitted at most once per hold-frequency interval.
    Repeated,

    Up,

    /// Pointer moved while a button was down. `start` is where the press began.
    Dragged {
        start: (f32, f32),
        delta: (f32, f32),
    },
}

/// One semantic input event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InputEvent {
    pub control: Control,
    pub kind: InputEventKind,

    /// Clock reading of the tick that produced the event.
    pub time_ns: u64,

    /// Pointer position in logical pixels. Only set for button events.
    pub pointer: Option<(f32, f32)>,
}

impl InputEvent {
    pub fn is_down(&self) -> bool {
        matches!(self.kind, InputEventKind::Down { .. })
    }

    pub fn down_count(&self) -> Option<u32> {
        match self.kind {
            InputEventKind::Down { down_count } => Some(down_count),
            _ => None,
        }
    }
}
