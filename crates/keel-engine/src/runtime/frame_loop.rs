use std::thread;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;

use crate::core::{App, AppControl, FrameCtx, SetupCtx};
use crate::delegate::{DelegateError, Delegator};
use crate::error::ConfigError;
use crate::input::{Control, InputFrame, InputPolicy, InputSource, InputTracker, RawInput};
use crate::panic;
use crate::time::{Clock, FrameTimer, SystemClock};

use super::config::RuntimeConfig;

/// Waits shorter than this are yielded instead of slept.
const SPIN_THRESHOLD: Duration = Duration::from_millis(1);

/// Failure that ended a run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("setup failed: {0:#}")]
    Setup(anyhow::Error),

    #[error("frame {frame} failed: {error:#}")]
    Frame { frame: u64, error: anyhow::Error },

    #[error("teardown failed: {0:#}")]
    Teardown(anyhow::Error),

    #[error(transparent)]
    Delegate(#[from] DelegateError),
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn set_frame_rate(&mut self, fps: i32) {
        self.commands.push(Command::SetFrameRate(fps));
    }

    /// Replaces the tracker-wide input policy. Validated now, applied later.
    pub fn set_input_policy(&mut self, policy: InputPolicy) -> Result<(), ConfigError> {
        policy.validate()?;
        self.commands.push(Command::SetInputPolicy(policy));
        Ok(())
    }

    /// Sets (`Some`) or clears (`None`) the policy of a single control.
    pub fn set_control_policy(
        &mut self,
        control: impl Into<Control>,
        policy: Option<InputPolicy>,
    ) -> Result<(), ConfigError> {
        if let Some(policy) = &policy {
            policy.validate()?;
        }
        self.commands
            .push(Command::SetControlPolicy(control.into(), policy));
        Ok(())
    }

    pub fn exit_requested(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Exit))
    }
}

#[derive(Debug)]
enum Command {
    Exit,
    SetFrameRate(i32),
    SetInputPolicy(InputPolicy),
    SetControlPolicy(Control, Option<InputPolicy>),
}

/// Owning-thread frame loop.
///
/// `run` turns the calling thread into the owning thread: input, timing and
/// delegated work all happen there.
pub struct Runtime<C: Clock = SystemClock> {
    config: RuntimeConfig,
    clock: C,
}

impl Runtime<SystemClock> {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> Runtime<C> {
    pub fn with_clock(config: RuntimeConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Runs `app` until it asks to exit or a callback fails.
    ///
    /// `on_teardown` is called whenever `on_setup` was reached, even if setup or a
    /// frame failed or panicked. The first failure is returned as a [`RuntimeError`].
    pub fn run<A, S>(self, app: &mut A, source: &mut S) -> Result<()>
    where
        A: App,
        S: InputSource,
    {
        let Runtime { config, clock } = self;
        config.validate().map_err(RuntimeError::from)?;

        let mut timer = FrameTimer::new(clock).with_smoothing_window(config.smoothing_window);
        timer.set_frame_rate(config.frame_rate);

        let mut session = Session {
            delegator: Delegator::new(),
            timer,
            tracker: InputTracker::new(config.input),
            raw: RawInput::default(),
            frame: InputFrame::default(),
            exit_requested: false,
        };

        let name = config.name.as_str();
        log::info!(
            "{name}: starting on {:?} (frame cap {} fps)",
            thread::current().id(),
            config.frame_rate
        );

        let mut outcome = session.setup(app, &config);
        if outcome.is_ok() {
            outcome = session.run_frames(app, source);
        }

        let teardown = panic::catch(|| app.on_teardown()).map_err(RuntimeError::Teardown);
        session.tracker.reset();
        if let Err(err) = session.delegator.shutdown() {
            log::error!("{name}: {err}");
        }

        log::info!(
            "{name}: stopped after {} frame(s), {:.3}s engine time",
            session.timer.frame_count(),
            session.timer.time()
        );

        match (outcome, teardown) {
            (Err(err), teardown) => {
                log::error!("{name}: {err}");
                if let Err(t) = teardown {
                    log::error!("{name}: {t}");
                }
                Err(err.into())
            }
            (Ok(()), Err(t)) => {
                log::error!("{name}: {t}");
                Err(t.into())
            }
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}

struct Session<C: Clock> {
    delegator: Delegator,
    timer: FrameTimer<C>,
    tracker: InputTracker,
    raw: RawInput,
    frame: InputFrame,
    exit_requested: bool,
}

impl<C: Clock> Session<C> {
    fn setup<A: App>(&mut self, app: &mut A, config: &RuntimeConfig) -> Result<(), RuntimeError> {
        let mut runtime = RuntimeCtx::default();

        // Scope to ensure `ctx` is dropped before commands are applied.
        let result = {
            let mut ctx = SetupCtx {
                config,
                delegator: &self.delegator,
                input: &mut self.tracker,
                runtime: &mut runtime,
            };
            panic::catch(|| app.on_setup(&mut ctx))
        };
        result.map_err(RuntimeError::Setup)?;

        self.apply_commands(runtime)
    }

    fn run_frames<A: App, S: InputSource>(
        &mut self,
        app: &mut A,
        source: &mut S,
    ) -> Result<(), RuntimeError> {
        while !self.exit_requested {
            self.step(app, source)?;
        }
        Ok(())
    }

    /// One loop iteration: either idles until the next admission or runs a full frame.
    fn step<A: App, S: InputSource>(
        &mut self,
        app: &mut A,
        source: &mut S,
    ) -> Result<(), RuntimeError> {
        if !self.timer.start_frame() {
            idle(self.timer.until_next_frame());
            return Ok(());
        }

        source.poll(&mut self.raw);
        self.frame.clear();
        self.tracker
            .update(&self.raw, self.timer.frame_start_ns(), &mut self.frame);

        let drained = self.delegator.drain()?;

        let time = self.timer.snapshot();
        let mut runtime = RuntimeCtx::default();
        let control = {
            let mut ctx = FrameCtx {
                input: &self.tracker,
                input_frame: &self.frame,
                time,
                delegator: &self.delegator,
                drained,
                runtime: &mut runtime,
            };
            panic::catch(|| app.on_frame(&mut ctx))
        };
        let control = control.map_err(|error| RuntimeError::Frame {
            frame: time.frame_index,
            error,
        })?;

        if control == AppControl::Exit {
            runtime.exit();
        }
        self.apply_commands(runtime)?;

        self.timer.end_frame();
        Ok(())
    }

    fn apply_commands(&mut self, mut ctx: RuntimeCtx) -> Result<(), RuntimeError> {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::Exit => self.exit_requested = true,
                Command::SetFrameRate(fps) => self.timer.set_frame_rate(fps),
                Command::SetInputPolicy(policy) => self.tracker.set_policy(policy)?,
                Command::SetControlPolicy(control, Some(policy)) => {
                    self.tracker.set_control_policy(control, policy)?
                }
                Command::SetControlPolicy(control, None) => {
                    self.tracker.clear_control_policy(control)
                }
            }
        }
        Ok(())
    }
}

fn idle(wait: Duration) {
    if wait > SPIN_THRESHOLD {
        thread::sleep(wait - SPIN_THRESHOLD);
    } else {
        thread::yield_now();
    }
}
