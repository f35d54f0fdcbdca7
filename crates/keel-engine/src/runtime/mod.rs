//! Owning-thread runtime loop.
//!
//! Binds the delegator, frame timer and input tracker to the calling thread and
//! drives an `App` through setup, frames and teardown.

mod config;
mod frame_loop;

pub use config::{
    RuntimeConfig, ENV_DOUBLE_PRESS_DELAY, ENV_FRAME_RATE, ENV_HOLD_FREQUENCY,
};
pub use frame_loop::{Runtime, RuntimeCtx, RuntimeError};
