//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (owning-thread loop)
//! and application code, and the per-callback contexts handed to it.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, SetupCtx};
