use crate::capture::TestLogger;
use crate::env::{env_or, TEST_LOG_CAPTURE_LEVEL_ENV, TEST_LOG_PRINT_LEVEL_ENV};
use crate::error::Error;
use crate::layer::CaptureLayer;
use crate::level::Level;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Capture configuration for a [`TestLogger`].
///
/// **Fields**
/// - `capture_level`: events below this level are not stored.
/// - `print_level`: if set, stored events at or above this level are also
///   rendered to stdout/stderr as they arrive.
/// - `enable_stdout`: if `true`, [`init_capture_with_config`] also installs a
///   `tracing_subscriber::fmt` layer so every `tracing` event is printed.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub capture_level: Level,
    pub print_level: Option<Level>,
    pub enable_stdout: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capture_level: Level::Trace,
            print_level: None,
            enable_stdout: false,
        }
    }
}

impl CaptureConfig {
    /// Defaults overridden by `TEST_LOG_CAPTURE_LEVEL` / `TEST_LOG_PRINT_LEVEL`.
    ///
    /// Values that don't name a level are reported and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(level) = level_from_env(TEST_LOG_CAPTURE_LEVEL_ENV) {
            config.capture_level = level;
        }
        config.print_level = level_from_env(TEST_LOG_PRINT_LEVEL_ENV);

        config
    }
}

fn level_from_env(key: &str) -> Option<Level> {
    let raw = env_or(key, "");
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(level) => Some(level),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring invalid level in environment");
            None
        }
    }
}

/// Install a global `tracing` subscriber that captures every event into
/// `logger`, using the logger's own [`CaptureConfig`].
///
/// **Returns**
/// - `Err(Error::SubscriberAlreadySet)` if a global default already exists.
///
/// Tests that run in parallel should prefer a scoped subscriber, see
/// [`CaptureLayer::new`].
pub fn init_capture(logger: Arc<TestLogger>) -> Result<(), Error> {
    let config = logger.config().clone();
    init_capture_with_config(logger, config)
}

/// Like [`init_capture`], with an explicit `config` deciding whether a
/// `fmt` layer is stacked on top.
pub fn init_capture_with_config(logger: Arc<TestLogger>, config: CaptureConfig) -> Result<(), Error> {
    let layer = CaptureLayer::new(logger);

    // Both variants install the capture layer; the `fmt` layer is only
    // added on request and changes the subscriber type.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}
