//! Process-wide tracing setup shared by the `sessiongate` binaries and tests.

/// Initialize process-wide tracing with the format named by
/// `SESSIONGATE_LOG_FORMAT` (JSON by default).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::LogFormat;
