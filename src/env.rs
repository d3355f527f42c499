//! Environment variable names used by this crate to configure capture
//! from a test run without code changes.
//!
//! These are purely helpers; [`CaptureConfig`](crate::init::CaptureConfig)
//! can always be built explicitly.

/// Minimum level stored by a `TestLogger`, e.g. `DEBUG`.
pub const TEST_LOG_CAPTURE_LEVEL_ENV: &str = "TEST_LOG_CAPTURE_LEVEL";

/// Minimum level echoed to stdout/stderr as events are captured. Unset
/// means nothing is echoed.
pub const TEST_LOG_PRINT_LEVEL_ENV: &str = "TEST_LOG_PRINT_LEVEL";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
