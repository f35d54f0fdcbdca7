//! Logging utilities.
//!
//! This module centralizes logger initialization. Library code only uses the
//! `log` facade; binaries call [`init_logging`] once to install `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
