//! Logging utilities.
//!
//! Centralizes logger initialization. The crate itself only speaks the `log`
//! facade; `env_logger` is wired up here for embedders that want a backend
//! without bringing their own.

mod init;

pub use init::{LoggingConfig, init_logging};
