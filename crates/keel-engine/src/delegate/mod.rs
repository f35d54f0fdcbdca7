//! Cross-thread task delegation.
//!
//! Exactly one thread owns windowing, input and timing state. Other threads hand work
//! to it through a `Delegator`: `post` for fire-and-forget, `call` to block for a result.
//! The owner runs everything during `drain`, once per frame.
//!
//! Owner-only operations check the calling thread at runtime and fail with
//! `DelegateError::NotOwningThread`.

mod delegator;
mod error;

pub use delegator::{Delegator, DrainReport};
pub use error::DelegateError;
