//! Keel engine crate.
//!
//! A single-owner application runtime: one thread owns input, timing and the frame
//! loop, and other threads reach it through a `Delegator`.

pub mod core;
pub mod delegate;
pub mod input;
pub mod runtime;
pub mod time;

pub mod logging;

mod error;
mod panic;

pub use error::ConfigError;
