use crate::delegate::{Delegator, DrainReport};
use crate::input::{InputFrame, InputTracker};
use crate::runtime::{RuntimeConfig, RuntimeCtx};
use crate::time::FrameTime;

/// Context passed to `core::App::on_setup`.
pub struct SetupCtx<'a> {
    pub config: &'a RuntimeConfig,

    /// Clone this into worker threads to reach the owning thread.
    pub delegator: &'a Delegator,

    /// Direct access for arming per-control policies before the first frame.
    pub input: &'a mut InputTracker,

    pub runtime: &'a mut RuntimeCtx,
}

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub input: &'a InputTracker,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub delegator: &'a Delegator,

    /// What the delegator ran just before this callback.
    pub drained: DrainReport,

    pub runtime: &'a mut RuntimeCtx,
}
