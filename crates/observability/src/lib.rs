//! Process-wide tracing setup shared by guardian binaries and hosts.

pub mod tracing;

pub use crate::tracing::{LogFormat, LOG_FORMAT_ENV};

/// Initialize logging filtered by `RUST_LOG` (default `info`), in the format
/// chosen by `GUARDIAN_LOG_FORMAT` (JSON unless set to `pretty`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    crate::tracing::init(LogFormat::from_env());
}
