use super::ctx::{FrameCtx, SetupCtx};

/// Control directive returned by `on_frame`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the runtime on the owning thread.
///
/// An error or panic from any callback ends the run. `on_teardown` is still called.
pub trait App {
    /// Called once before the first frame.
    fn on_setup(&mut self, ctx: &mut SetupCtx<'_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per admitted frame, after input was sampled and delegated work ran.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> anyhow::Result<AppControl>;

    /// Called exactly once when the run ends, whatever the reason.
    fn on_teardown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
