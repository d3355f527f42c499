use crate::capture::TestLogger;
use crate::event::EventBuilder;
use crate::failure::AttachedError;
use crate::marker::Marker;
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

const OWN_TARGET: &str = "tracing_log_capture";

/// `tracing_subscriber` layer that turns `tracing` events into
/// [`LoggingEvent`](crate::event::LoggingEvent)s stored on a [`TestLogger`].
///
/// The `message` field becomes the event message, a `marker` field becomes
/// its [`Marker`] and an error recorded in an `error` field is attached via
/// [`AttachedError::from_ref`], so logging the same error value twice yields
/// equal events. All other fields, together with the fields of the enclosing
/// spans, form the context. The event's own fields win over span fields with the same name.
///
/// For per-test capture, scope the subscriber instead of installing it
/// globally:
///
/// ```
/// use tracing_log_capture::{CaptureLayer, TestLogger};
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let logger = TestLogger::new("orders");
/// let subscriber = tracing_subscriber::Registry::default()
///     .with(CaptureLayer::new(logger.clone()));
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::info!(order_id = 7, "order accepted");
/// });
/// assert_eq!(logger.events()[0].message(), "order accepted");
/// ```
pub struct CaptureLayer {
    logger: Arc<TestLogger>,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events stored on the logger.
    pub captured_events: Arc<AtomicU64>,
}

impl CaptureLayer {
    pub fn new(logger: Arc<TestLogger>) -> Self {
        Self {
            logger,
            total_events: Arc::new(AtomicU64::new(0)),
            captured_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn logger(&self) -> &Arc<TestLogger> {
        &self.logger
    }
}

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Fields recorded on a span, kept in its extensions.
struct SpanFields(BTreeMap<String, String>);

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            eprintln!("capture layer: span {:?} not found on creation", id);
            return;
        };

        let mut fields = BTreeMap::new();
        attrs.record(&mut ContextVisitor { fields: &mut fields });
        span.extensions_mut().insert(SpanFields(fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            values.record(&mut ContextVisitor { fields });
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }

        let mut context = BTreeMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                    context.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }

        let mut visitor = EventVisitor {
            context: &mut context,
            message: None,
            marker: None,
            error: None,
        };
        event.record(&mut visitor);
        let EventVisitor {
            message,
            marker,
            error,
            ..
        } = visitor;

        let builder = EventBuilder::new(meta.level().into(), message.unwrap_or_default())
            .context(context)
            .marker(marker)
            .error(error);

        if self.logger.log(builder) {
            self.captured_events.fetch_add(1, Ordering::Relaxed);
        }
    }
}

use tracing::field::{Field, Visit};

/// Collects every field as a context entry.
struct ContextVisitor<'a> {
    fields: &'a mut BTreeMap<String, String>,
}

impl<'a> Visit for ContextVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields.insert(field.name().to_string(), format!("{:?}", value));
    }
}

/// Splits an event's fields into message, marker, error and context.
struct EventVisitor<'a> {
    context: &'a mut BTreeMap<String, String>,
    message: Option<String>,
    marker: Option<Marker>,
    error: Option<AttachedError>,
}

impl<'a> Visit for EventVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "marker" => self.marker = Some(Marker::new(value)),
            name => {
                self.context.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if field.name() != "error" {
            self.context.insert(field.name().to_string(), value.to_string());
            return;
        }

        self.error = Some(AttachedError::from_ref(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{:?}", value);
        match field.name() {
            "message" => self.message = Some(text),
            "marker" => self.marker = Some(Marker::new(text)),
            name => {
                self.context.insert(name.to_string(), text);
            }
        }
    }
}
