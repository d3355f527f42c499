use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::event::{EventBuilder, LoggingEvent};
use crate::init::CaptureConfig;

/// Non-owning reference from an event back to the logger that created it.
///
/// Holds only the logger's name, so an event never keeps its logger alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreatorRef {
    name: Arc<str>,
}

impl CreatorRef {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CreatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for CreatorRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Shared destination for printed events.
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Where a [`TestLogger`] prints events admitted by its print level.
#[derive(Clone, Default)]
pub enum PrintTarget {
    /// The process stdout and stderr.
    #[default]
    Stdio,
    /// WARN and ERROR go to `err`, everything else to `out`. Both may be
    /// the same writer.
    Writers { out: SharedWriter, err: SharedWriter },
}

impl PrintTarget {
    fn print(&self, event: &LoggingEvent) {
        match self {
            PrintTarget::Stdio => event.render(),
            PrintTarget::Writers { out, err } => {
                let writer = if event.level().is_diagnostic() { err } else { out };
                let mut writer = writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Err(e) = event.write_rendered(&mut *writer) {
                    eprintln!("failed to print captured event: {}", e);
                }
            }
        }
    }
}

impl fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintTarget::Stdio => f.write_str("Stdio"),
            PrintTarget::Writers { .. } => f.write_str("Writers"),
        }
    }
}

/// Named, thread-safe store of [`LoggingEvent`]s for test assertions.
///
/// Events logged through a `TestLogger` remember it as their creator. Events
/// below [`CaptureConfig::capture_level`] are dropped; events at or above
/// [`CaptureConfig::print_level`] are also printed to its [`PrintTarget`].
pub struct TestLogger {
    name: Arc<str>,
    config: CaptureConfig,
    target: PrintTarget,
    events: Mutex<Vec<LoggingEvent>>,
}

impl TestLogger {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_config(name, CaptureConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: CaptureConfig) -> Arc<Self> {
        Self::with_target(name, config, PrintTarget::Stdio)
    }

    pub fn with_target(
        name: impl Into<String>,
        config: CaptureConfig,
        target: PrintTarget,
    ) -> Arc<Self> {
        Arc::new(TestLogger {
            name: Arc::from(name.into()),
            config,
            target,
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Build the event with this logger as its creator and store it.
    ///
    /// **Returns**
    /// - `true` if the event passed the capture level and was stored.
    pub fn log(&self, event: EventBuilder) -> bool {
        if event.level() < self.config.capture_level {
            return false;
        }

        let event = event.build_with(self.creator());
        if self
            .config
            .print_level
            .is_some_and(|print_level| event.level() >= print_level)
        {
            self.target.print(&event);
        }

        self.lock().push(event);
        true
    }

    /// Snapshot of the events captured so far, in logging order.
    pub fn events(&self) -> Vec<LoggingEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        let cleared = {
            let mut events = self.lock();
            let n = events.len();
            events.clear();
            n
        };
        tracing::debug!(logger = %self.name, cleared, "cleared captured events");
    }

    fn creator(&self) -> CreatorRef {
        CreatorRef {
            name: Arc::clone(&self.name),
        }
    }

    // A panic while holding the lock cannot leave a half-written event.
    fn lock(&self) -> MutexGuard<'_, Vec<LoggingEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for TestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestLogger")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("target", &self.target)
            .field("events", &self.len())
            .finish()
    }
}
