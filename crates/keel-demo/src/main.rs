use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use keel_engine::core::{App, AppControl, FrameCtx, SetupCtx};
use keel_engine::delegate::DelegateError;
use keel_engine::input::{InputEventKind, Key, Modifier, MouseButton, ScriptedInput};
use keel_engine::logging::{init_logging, LoggingConfig};
use keel_engine::runtime::{Runtime, RuntimeConfig};

/// Frames to run before exiting on our own.
const DEMO_FRAMES: u64 = 120;

/// Reports owner-side input events and exposes a frame counter to a worker thread.
struct Demo {
    frames: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl App for Demo {
    fn on_setup(&mut self, ctx: &mut SetupCtx<'_>) -> anyhow::Result<()> {
        ctx.input.set_hold_frequency(0.1)?;
        ctx.input.arm_held(Key::A, Duration::from_millis(250));

        let delegator = ctx.delegator.clone();
        let frames = Arc::clone(&self.frames);

        let worker = thread::Builder::new()
            .name("telemetry".into())
            .spawn(move || {
                for round in 1.. {
                    thread::sleep(Duration::from_millis(250));

                    delegator.post(move || {
                        log::info!("telemetry round {round} delivered on the owning thread");
                        Ok(())
                    });

                    let frames = Arc::clone(&frames);
                    match delegator.call(move || Ok(frames.load(Ordering::Relaxed))) {
                        Ok(n) => log::info!("owner has completed {n} frame(s)"),
                        Err(DelegateError::Closed) => break,
                        Err(err) => {
                            log::warn!("telemetry call failed: {err}");
                            break;
                        }
                    }
                }
            })
            .context("failed to spawn telemetry thread")?;

        self.worker = Some(worker);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> anyhow::Result<AppControl> {
        for ev in &ctx.input_frame.events {
            match ev.kind {
                InputEventKind::Down { down_count } if down_count > 1 => {
                    log::info!("{} pressed x{down_count}", ev.control)
                }
                InputEventKind::Dragged { start, delta } => {
                    log::info!("{} dragged from {start:?} by {delta:?}", ev.control)
                }
                kind => log::debug!("{} {kind:?}", ev.control),
            }
        }

        if ctx.input_frame.pressed(Key::A) && ctx.input_frame.modifiers.only(Modifier::SHIFT) {
            log::info!("shift+A");
        }
        if ctx.input_frame.held(Key::A) {
            log::info!("A held, repeating every 100ms");
        }

        self.frames.store(ctx.time.frame_index + 1, Ordering::Relaxed);

        if ctx.time.frame_index + 1 >= DEMO_FRAMES {
            if let Some(rate) = ctx.time.frame_rate {
                log::info!("smoothed frame rate {rate:.1} fps");
            }
            return Ok(AppControl::Exit);
        }
        Ok(AppControl::Continue)
    }

    fn on_teardown(&mut self) -> anyhow::Result<()> {
        log::info!("demo finished");
        Ok(())
    }
}

fn script() -> ScriptedInput {
    ScriptedInput::new()
        // Double press.
        .tap(5, 3, Key::Space)
        .tap(10, 3, Key::Space)
        // Shift+A, held long enough to repeat.
        .press(20, Key::ShiftLeft)
        .press(22, Key::A)
        .release(60, Key::A)
        .release(61, Key::ShiftLeft)
        // Drag with the left button.
        .pointer(0, 100.0, 100.0)
        .press(70, MouseButton::Left)
        .pointer(72, 120.0, 110.0)
        .pointer(74, 140.0, 90.0)
        .release(76, MouseButton::Left)
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        name: "keel-demo".into(),
        ..RuntimeConfig::default()
    }
    .with_env_overrides()?;

    let mut app = Demo {
        frames: Arc::new(AtomicU64::new(0)),
        worker: None,
    };
    let result = Runtime::new(config).run(&mut app, &mut script());

    // The worker is released with `Closed` once the runtime has shut down.
    if let Some(worker) = app.worker.take() {
        if worker.join().is_err() {
            log::error!("telemetry thread panicked");
        }
    }

    result
}
