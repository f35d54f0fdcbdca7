use std::thread::ThreadId;
use std::time::Duration;

use thiserror::Error;

/// Failure of a delegated operation.
#[derive(Debug, Error)]
pub enum DelegateError {
    /// The task body returned an error or panicked.
    ///
    /// The task's own error is kept intact; use `anyhow::Error::downcast_ref` to inspect it.
    #[error("delegated task failed: {0:#}")]
    Execution(anyhow::Error),

    /// An owner-only operation was invoked from another thread.
    #[error("`{operation}` must run on the owning thread {owner:?}, called from {caller:?}")]
    NotOwningThread {
        operation: &'static str,
        owner: ThreadId,
        caller: ThreadId,
    },

    /// Another blocking call is still outstanding.
    #[error("a blocking call is already pending")]
    Busy,

    /// The delegator was shut down before the task could complete.
    #[error("delegator is shut down")]
    Closed,

    /// `call_timeout` gave up waiting.
    #[error("blocking call timed out after {0:?}")]
    Timeout(Duration),
}

impl DelegateError {
    /// Error produced by the task body, if that is what failed.
    pub fn execution(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Execution(err) => Some(err),
            _ => None,
        }
    }
}
