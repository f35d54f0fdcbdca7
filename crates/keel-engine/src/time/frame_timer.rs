use std::time::Duration;

use super::clock::{Clock, SystemClock};
use super::samples::SampleRing;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Default time constant of the frame-duration filter.
pub const DEFAULT_SMOOTHING_WINDOW: Duration = Duration::from_secs(1);

/// Frame timing snapshot handed to per-frame callbacks.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Raw time elapsed since the previous admitted frame, in seconds.
    pub dt: f32,

    /// Raw elapsed time in nanoseconds.
    pub dt_ns: u64,

    /// Clock reading at admission.
    pub now_ns: u64,

    /// Engine time before this frame is accounted.
    pub engine_time_ns: u64,

    /// Number of frames completed before this one.
    pub frame_index: u64,

    /// Smoothed rate over completed frames, if any.
    pub frame_rate: Option<f64>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TimerState {
    /// `start_frame` has not been called yet.
    Idle,
    Running,
}

/// Converts clock readings into discrete frames at a target cadence.
///
/// A frame is admitted by `start_frame` once at least one target interval has elapsed
/// since the previous admitted frame (or since construction while idle), and is
/// accounted by `end_frame`. Engine time only advances through accounted frames.
///
/// Observed frame duration is smoothed with a single-pole filter whose time
/// constant is the smoothing window.
#[derive(Debug, Clone)]
pub struct FrameTimer<C: Clock = SystemClock> {
    clock: C,
    state: TimerState,

    setup_ns: u64,
    target_interval_ns: u64,
    smoothing_window_ns: u64,

    last_frame_ns: u64,
    delta_ns: u64,
    in_frame: bool,

    smoothed_ns: f64,
    smoothed_samples: SampleRing,
    raw_samples: SampleRing,

    engine_time_ns: u64,
    frame_count: u64,
}

impl FrameTimer<SystemClock> {
    pub fn system() -> Self {
        Self::new(SystemClock::new())
    }
}

impl<C: Clock> FrameTimer<C> {
    /// Creates an uncapped timer. The clock is sampled immediately as the setup time.
    pub fn new(clock: C) -> Self {
        let setup_ns = clock.now_ns();
        Self {
            clock,
            state: TimerState::Idle,
            setup_ns,
            target_interval_ns: 0,
            smoothing_window_ns: DEFAULT_SMOOTHING_WINDOW.as_nanos() as u64,
            last_frame_ns: setup_ns,
            delta_ns: 0,
            in_frame: false,
            smoothed_ns: 0.0,
            smoothed_samples: SampleRing::default(),
            raw_samples: SampleRing::default(),
            engine_time_ns: 0,
            frame_count: 0,
        }
    }

    /// Overrides the smoothing window. Zero is raised to one nanosecond.
    pub fn with_smoothing_window(mut self, window: Duration) -> Self {
        self.smoothing_window_ns = u64::try_from(window.as_nanos()).unwrap_or(u64::MAX).max(1);
        self
    }

    /// Sets the target frame rate. `fps <= 0` disables the cap.
    pub fn set_frame_rate(&mut self, fps: i32) {
        self.target_interval_ns = if fps > 0 {
            1_000_000_000 / fps as u64
        } else {
            0
        };
        log::debug!(
            "frame cap set to {fps} fps ({} ns interval)",
            self.target_interval_ns
        );
    }

    pub fn target_interval(&self) -> Duration {
        Duration::from_nanos(self.target_interval_ns)
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Samples the clock and reports whether a new frame is admitted.
    ///
    /// A refused call changes nothing but the idle/running state.
    pub fn start_frame(&mut self) -> bool {
        self.state = TimerState::Running;

        let now = self.clock.now_ns();
        let delta = now.saturating_sub(self.last_frame_ns);
        if delta < self.target_interval_ns {
            return false;
        }

        self.last_frame_ns = now;
        self.delta_ns = delta;
        self.in_frame = true;
        true
    }

    /// Accounts the frame admitted by the last `start_frame`.
    ///
    /// The filter gain `delta / window` is clamped to 1, so a frame longer than the
    /// smoothing window sets the smoothed duration to that frame's duration.
    pub fn end_frame(&mut self) {
        if !self.in_frame {
            log::warn!("end_frame called without an admitted frame; ignoring");
            return;
        }
        self.in_frame = false;

        let delta = self.delta_ns as f64;
        let gain = (delta / self.smoothing_window_ns as f64).min(1.0);
        self.smoothed_ns += gain * (delta - self.smoothed_ns);

        self.smoothed_samples.push(self.smoothed_ns.round() as u64);
        self.raw_samples.push(self.delta_ns);

        self.engine_time_ns = self.engine_time_ns.saturating_add(self.delta_ns);
        self.frame_count += 1;
    }

    /// Time left before `start_frame` would admit a frame.
    pub fn until_next_frame(&self) -> Duration {
        let elapsed = self.clock.now_ns().saturating_sub(self.last_frame_ns);
        Duration::from_nanos(self.target_interval_ns.saturating_sub(elapsed))
    }

    /// Clock reading at the most recent admission (setup time while idle).
    pub fn frame_start_ns(&self) -> u64 {
        self.last_frame_ns
    }

    pub fn snapshot(&self) -> FrameTime {
        FrameTime {
            dt: (self.delta_ns as f64 / NANOS_PER_SEC) as f32,
            dt_ns: self.delta_ns,
            now_ns: self.last_frame_ns,
            engine_time_ns: self.engine_time_ns,
            frame_index: self.frame_count,
            frame_rate: self.frame_rate(),
        }
    }

    // ── clock time ────────────────────────────────────────────────────────

    /// Clock time elapsed since the timer was created.
    pub fn raw_time_ns(&self) -> u64 {
        self.clock.now_ns().saturating_sub(self.setup_ns)
    }

    pub fn raw_time(&self) -> f64 {
        self.raw_time_ns() as f64 / NANOS_PER_SEC
    }

    /// Sum of all accounted frame deltas.
    pub fn time_ns(&self) -> u64 {
        self.engine_time_ns
    }

    pub fn time(&self) -> f64 {
        self.engine_time_ns as f64 / NANOS_PER_SEC
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // ── frame durations ───────────────────────────────────────────────────

    pub fn raw_frame_time_ns(&self) -> Option<u64> {
        self.raw_samples.latest()
    }

    pub fn raw_frame_time(&self) -> Option<f64> {
        self.raw_frame_time_ns().map(|ns| ns as f64 / NANOS_PER_SEC)
    }

    pub fn frame_time_ns(&self) -> Option<f64> {
        (self.frame_count > 0).then_some(self.smoothed_ns)
    }

    pub fn frame_time(&self) -> Option<f64> {
        self.frame_time_ns().map(|ns| ns / NANOS_PER_SEC)
    }

    /// `1e9 / raw delta`; `None` before the first frame or for a zero delta.
    pub fn raw_frame_rate(&self) -> Option<f64> {
        self.raw_frame_time_ns()
            .filter(|&ns| ns > 0)
            .map(|ns| NANOS_PER_SEC / ns as f64)
    }

    /// `1e9 / smoothed delta`; `None` before the first frame or while the filter is at zero.
    pub fn frame_rate(&self) -> Option<f64> {
        self.frame_time_ns()
            .filter(|&ns| ns > 0.0)
            .map(|ns| NANOS_PER_SEC / ns)
    }

    pub fn smoothed_samples(&self) -> &SampleRing {
        &self.smoothed_samples
    }

    pub fn raw_samples(&self) -> &SampleRing {
        &self.raw_samples
    }
}
