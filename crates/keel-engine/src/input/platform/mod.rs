//! Platform translation layers.

mod winit;

pub use self::winit::{map_key, map_mouse_button, WinitInputSource};
