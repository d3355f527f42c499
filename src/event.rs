use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};

use crate::argument::Arg;
use crate::capture::CreatorRef;
use crate::error::Error;
use crate::failure::AttachedError;
use crate::format::format_message;
use crate::level::Level;
use crate::marker::Marker;

/// Record of a single call to a logger, kept for test assertions.
///
/// Equality and hashing compare exactly:
/// - [`level`](Self::level)
/// - [`context`](Self::context)
/// - [`marker`](Self::marker)
/// - [`error`](Self::error)
/// - [`message`](Self::message)
/// - [`arguments`](Self::arguments)
///
/// The timestamp, thread name and creating logger are left out so that an
/// expected event can be built in a test without controlling time or threads.
#[derive(Debug, Clone, Serialize)]
pub struct LoggingEvent {
    level: Level,
    context: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<AttachedError>,
    message: String,
    arguments: Vec<Arg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creating_logger: Option<CreatorRef>,
    timestamp: DateTime<Utc>,
    thread_name: String,
}

/// Named inputs for [`LoggingEvent::from_parts`].
///
/// `level` and `message` are required; everything else defaults to empty.
#[derive(Debug, Clone, Default)]
pub struct EventParts {
    pub level: Option<Level>,
    pub context: BTreeMap<String, String>,
    pub marker: Option<Marker>,
    pub error: Option<AttachedError>,
    pub message: Option<String>,
    pub arguments: Vec<Arg>,
}

impl LoggingEvent {
    /// Build an event from its parts.
    ///
    /// **Returns**
    /// - `Err(Error::MissingLevel)` / `Err(Error::MissingMessage)` if either
    ///   required part is absent.
    pub fn from_parts(mut parts: EventParts) -> Result<Self, Error> {
        let level = parts.level.take().ok_or(Error::MissingLevel)?;
        let message = parts.message.take().ok_or(Error::MissingMessage)?;
        Ok(Self::stamp(None, level, message, parts))
    }

    /// Start building an event; see also [`Level::event`].
    pub fn builder(level: Level, message: impl Into<String>) -> EventBuilder {
        EventBuilder::new(level, message)
    }

    // Captures the creation time and thread; `level` and `message` in
    // `rest` are ignored.
    fn stamp(
        creating_logger: Option<CreatorRef>,
        level: Level,
        message: String,
        rest: EventParts,
    ) -> Self {
        LoggingEvent {
            level,
            context: rest.context,
            marker: rest.marker,
            error: rest.error,
            message,
            arguments: rest.arguments,
            creating_logger,
            timestamp: Utc::now(),
            thread_name: current_thread_name(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn error(&self) -> Option<&AttachedError> {
        self.error.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn arguments(&self) -> &[Arg] {
        &self.arguments
    }

    /// Time at which the event was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Name of the thread that created the event.
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// The logger that created this event.
    ///
    /// Fails with [`Error::NoCreatingLogger`] for events built directly
    /// rather than through a [`TestLogger`](crate::capture::TestLogger).
    pub fn creating_logger(&self) -> Result<&CreatorRef, Error> {
        self.creating_logger.as_ref().ok_or(Error::NoCreatingLogger)
    }

    /// The message with its arguments substituted into the placeholders.
    pub fn formatted_message(&self) -> String {
        format_message(&self.message, &self.arguments)
    }

    /// `<timestamp> [<thread>] <LEVEL>[ <logger>] - <formatted message>`
    pub fn log_line(&self) -> String {
        let logger = self
            .creating_logger
            .as_ref()
            .map(|creator| format!(" {}", creator.name()))
            .unwrap_or_default();

        format!(
            "{} [{}] {}{} - {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.thread_name,
            self.level,
            logger,
            self.formatted_message()
        )
    }

    /// Write the log line, and the error trace if any, to `err` for WARN and
    /// ERROR events and to `out` for everything else.
    pub fn render_to<O, E>(&self, out: &mut O, err: &mut E) -> io::Result<()>
    where
        O: Write + ?Sized,
        E: Write + ?Sized,
    {
        if self.level.is_diagnostic() {
            self.write_rendered(err)
        } else {
            self.write_rendered(out)
        }
    }

    /// Print the event to stdout or stderr, see [`render_to`](Self::render_to).
    ///
    /// Write failures are ignored.
    pub fn render(&self) {
        let stdout = io::stdout();
        let stderr = io::stderr();
        let _ = self.render_to(&mut stdout.lock(), &mut stderr.lock());
    }

    pub(crate) fn write_rendered<W: Write + ?Sized>(&self, stream: &mut W) -> io::Result<()> {
        writeln!(stream, "{}", self.log_line())?;
        if let Some(error) = &self.error {
            writeln!(stream, "{}", error.trace())?;
        }
        Ok(())
    }

    /// Serialize the event, metadata included, as a single JSON line.
    #[cfg(feature = "json")]
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    // The only place that decides what takes part in equality and hashing.
    #[allow(clippy::type_complexity)]
    fn identity(
        &self,
    ) -> (
        &Level,
        &BTreeMap<String, String>,
        &Option<Marker>,
        &Option<AttachedError>,
        &str,
        &[Arg],
    ) {
        (
            &self.level,
            &self.context,
            &self.marker,
            &self.error,
            self.message.as_str(),
            self.arguments.as_slice(),
        )
    }
}

impl PartialEq for LoggingEvent {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for LoggingEvent {}

impl Hash for LoggingEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for LoggingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.log_line())
    }
}

fn current_thread_name() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}

/// Builder returned by [`LoggingEvent::builder`] and [`Level::event`].
///
/// ```
/// use tracing_log_capture::{Level, Marker};
///
/// let event = Level::Info
///     .event("User {} logged in")
///     .marker(Marker::new("AUDIT"))
///     .arg("alice")
///     .build();
/// assert_eq!(event.formatted_message(), "User alice logged in");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct EventBuilder {
    level: Level,
    message: String,
    rest: EventParts,
}

impl EventBuilder {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        EventBuilder {
            level,
            message: message.into(),
            rest: EventParts::default(),
        }
    }

    /// Replace the context with a copy of `context`.
    pub fn context<I, K, V>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.rest.context = context
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.rest.context.insert(key.into(), value.into());
        self
    }

    pub fn marker(mut self, marker: impl Into<Option<Marker>>) -> Self {
        self.rest.marker = marker.into();
        self
    }

    pub fn error(mut self, error: impl Into<Option<AttachedError>>) -> Self {
        self.rest.error = error.into();
        self
    }

    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.rest.arguments.push(arg.into());
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.rest.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn into_parts(self) -> EventParts {
        EventParts {
            level: Some(self.level),
            message: Some(self.message),
            ..self.rest
        }
    }

    pub fn build(self) -> LoggingEvent {
        LoggingEvent::stamp(None, self.level, self.message, self.rest)
    }

    pub(crate) fn build_with(self, creator: CreatorRef) -> LoggingEvent {
        LoggingEvent::stamp(Some(creator), self.level, self.message, self.rest)
    }
}
