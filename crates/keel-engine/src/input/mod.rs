//! Input subsystem.
//!
//! Platform layers report raw levels through an [`InputSource`]; the [`InputTracker`]
//! samples them once per frame and produces semantic events in an [`InputFrame`].
//! The public API does not expose winit types outside of `platform`.

mod frame;
mod modifiers;
mod policy;
mod raw;
mod signal;
mod source;
mod tracker;
mod types;

pub mod platform;

pub use crate::error::ConfigError;
pub use frame::InputFrame;
pub use modifiers::{Modifier, ModifierSet};
pub use policy::InputPolicy;
pub(crate) use policy::positive_seconds;
pub use raw::RawInput;
pub use signal::{InputSignal, SignalState};
pub use source::{InputSource, ScriptedInput};
pub use tracker::InputTracker;
pub use types::{Control, InputEvent, InputEventKind, Key, MouseButton};
