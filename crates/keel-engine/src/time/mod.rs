//! Time subsystem.
//!
//! Provides a clock seam and frame pacing without coupling to the runtime.
//! Intended usage:
//! - one `FrameTimer` per owning loop
//! - call `start_frame()` every iteration and `end_frame()` after each admitted frame
//! - tests drive the timer through a `ManualClock`

mod clock;
mod frame_timer;
mod samples;

pub use clock::{Clock, ManualClock, SystemClock};
pub use frame_timer::{FrameTime, FrameTimer, TimerState, DEFAULT_SMOOTHING_WINDOW};
pub use samples::{SampleRing, FRAME_SAMPLE_CAPACITY};
