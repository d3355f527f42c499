use pretty_assertions::{assert_eq, assert_ne};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use tracing_log_capture::*;

#[derive(Debug, thiserror::Error)]
#[error("charge rejected")]
struct ChargeError {
    code: u32,
    #[source]
    source: GatewayError,
}

#[derive(Debug, thiserror::Error)]
#[error("gateway timeout")]
struct GatewayError;

/// Run `f` with a scoped capture subscriber; returns (total, captured) counts.
fn capture<F: FnOnce()>(logger: &Arc<TestLogger>, f: F) -> (u64, u64) {
    let layer = CaptureLayer::new(logger.clone());
    assert!(Arc::ptr_eq(layer.logger(), logger));
    let total = layer.total_events.clone();
    let captured = layer.captured_events.clone();
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::with_default(subscriber, f);

    (
        total.load(Ordering::Relaxed),
        captured.load(Ordering::Relaxed),
    )
}

#[test]
fn logger_stamps_itself_as_creator() {
    let logger = TestLogger::new("payments");
    assert!(logger.log(Level::Info.event("charged {}").arg(12)));

    let events = logger.events();
    assert_eq!(events.len(), 1);
    let creator = events[0].creating_logger().unwrap();
    assert_eq!(creator.name(), "payments");
    assert!(events[0].log_line().contains(" INFO payments - charged 12"));
}

#[test]
fn captured_event_equals_expected_event_without_creator() {
    let logger = TestLogger::new("payments");
    logger.log(Level::Warn.event("retrying {}").arg("card"));

    let expected = Level::Warn.event("retrying {}").arg("card").build();
    assert_eq!(logger.events(), vec![expected]);
}

#[test]
fn capture_level_filters_events() {
    let config = CaptureConfig {
        capture_level: Level::Info,
        ..CaptureConfig::default()
    };
    let logger = TestLogger::with_config("filtered", config);

    assert!(!logger.log(Level::Debug.event("noise")));
    assert!(logger.log(Level::Info.event("kept")));
    assert!(logger.log(Level::Error.event("kept too")));

    let messages: Vec<String> = logger
        .events()
        .iter()
        .map(|e| e.message().to_string())
        .collect();
    assert_eq!(messages, vec!["kept", "kept too"]);
}

#[test]
fn clear_empties_the_store() {
    let logger = TestLogger::new("clearing");
    logger.log(Level::Info.event("one"));
    logger.log(Level::Info.event("two"));
    assert_eq!(logger.len(), 2);

    logger.clear();
    assert!(logger.is_empty());
    assert!(logger.events().is_empty());
}

#[test]
fn events_outlive_their_logger() {
    let logger = TestLogger::new("short-lived");
    logger.log(Level::Info.event("hello"));
    let events = logger.events();
    let weak = Arc::downgrade(&logger);
    drop(logger);

    assert!(weak.upgrade().is_none());
    assert_eq!(events[0].creating_logger().unwrap().name(), "short-lived");
}

#[test]
fn concurrent_logging_keeps_every_event() {
    let logger = TestLogger::new("threads");
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    logger.log(Level::Debug.event("t{} i{}").arg(t).arg(i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(logger.len(), 100);
}

#[test]
fn layer_captures_tracing_events() {
    let logger = TestLogger::new("orders");
    let (total, captured) = capture(&logger, || {
        tracing::info!(order_id = 7, customer = "alice", "order accepted");
        tracing::debug!("details hidden");
    });

    let events = logger.events();
    assert_eq!(events.len(), 2);
    assert_eq!((total, captured), (2, 2));

    let expected = Level::Info
        .event("order accepted")
        .context_entry("order_id", "7")
        .context_entry("customer", "alice")
        .build();
    assert_eq!(events[0], expected);
    assert_eq!(events[1].level(), Level::Debug);
    assert!(events[1].arguments().is_empty());
}

#[test]
fn layer_merges_span_fields_into_context() {
    let logger = TestLogger::new("spans");
    capture(&logger, || {
        let outer = tracing::info_span!("request", request_id = "r-1", user = "bob");
        let _outer = outer.enter();
        let inner = tracing::info_span!("db", table = tracing::field::Empty);
        inner.record("table", "orders");
        let _inner = inner.enter();
        tracing::warn!(user = "carol", "slow query");
    });

    let events = logger.events();
    assert_eq!(events.len(), 1);
    let context = events[0].context();
    assert_eq!(context["request_id"], "r-1");
    assert_eq!(context["table"], "orders");
    assert_eq!(context["user"], "carol");
}

#[test]
fn layer_extracts_marker_and_error() {
    let logger = TestLogger::new("billing");
    let failure = ChargeError {
        code: 402,
        source: GatewayError,
    };
    capture(&logger, || {
        tracing::error!(
            marker = "PAYMENT",
            error = &failure as &(dyn std::error::Error + 'static),
            "charge failed"
        );
    });

    let events = logger.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.marker(), Some(&Marker::new("PAYMENT")));
    assert!(event.context().is_empty());

    let error = event.error().unwrap();
    assert_eq!(error.trace(), "charge rejected\nCaused by: gateway timeout");

    let mut out = Vec::new();
    let mut err = Vec::new();
    event.render_to(&mut out, &mut err).unwrap();
    assert!(out.is_empty());
    let err = String::from_utf8(err).unwrap();
    assert!(err.contains(" ERROR billing - charge failed\n"), "{}", err);
    assert!(err.ends_with("charge rejected\nCaused by: gateway timeout\n"));
}

#[test]
fn layer_respects_capture_level() {
    let config = CaptureConfig {
        capture_level: Level::Warn,
        ..CaptureConfig::default()
    };
    let logger = TestLogger::with_config("quiet", config);
    let (total, captured) = capture(&logger, || {
        tracing::info!("ignored");
        tracing::warn!("kept");
    });

    assert_eq!(logger.len(), 1);
    assert_eq!((total, captured), (2, 1));
}

#[test]
fn layer_ignores_own_diagnostics() {
    let logger = TestLogger::new("self");
    capture(&logger, || {
        logger.log(Level::Info.event("direct"));
        logger.clear();
        tracing::info!("after clear");
    });

    let events = logger.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message(), "after clear");
}

#[test]
fn config_defaults() {
    let config = CaptureConfig::default();
    assert_eq!(config.capture_level, Level::Trace);
    assert_eq!(config.print_level, None);
    assert!(!config.enable_stdout);
}

#[test]
fn same_error_logged_twice_gives_equal_events() {
    let logger = TestLogger::new("billing");
    let failure = ChargeError {
        code: 402,
        source: GatewayError,
    };
    let other = ChargeError {
        code: 402,
        source: GatewayError,
    };
    capture(&logger, || {
        tracing::error!(error = &failure as &(dyn std::error::Error + 'static), "x");
        tracing::error!(error = &failure as &(dyn std::error::Error + 'static), "x");
        tracing::error!(error = &other as &(dyn std::error::Error + 'static), "x");
    });

    let events = logger.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], events[1]);
    assert_ne!(events[0], events[2]);
    assert_eq!(failure.code, other.code);

    let expected = Level::Error
        .event("x")
        .error(AttachedError::from_ref(&failure))
        .build();
    assert_eq!(events[0], expected);
    assert_ne!(events[2], expected);
}

fn buffers() -> (Arc<Mutex<Vec<u8>>>, Arc<Mutex<Vec<u8>>>, PrintTarget) {
    let out = Arc::new(Mutex::new(Vec::new()));
    let err = Arc::new(Mutex::new(Vec::new()));
    let target = PrintTarget::Writers {
        out: out.clone(),
        err: err.clone(),
    };
    (out, err, target)
}

fn text(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
}

#[test]
fn print_level_routes_warn_to_err_and_skips_lower_levels() {
    let (out, err, target) = buffers();
    let config = CaptureConfig {
        print_level: Some(Level::Warn),
        ..CaptureConfig::default()
    };
    let logger = TestLogger::with_target("printer", config, target);

    logger.log(Level::Info.event("quiet"));
    logger.log(Level::Warn.event("disk {} full").arg("/var"));

    assert_eq!(logger.len(), 2);
    assert_eq!(text(&out), "");
    let printed = text(&err);
    assert_eq!(printed.lines().count(), 1);
    assert!(printed.ends_with(" WARN printer - disk /var full\n"), "{}", printed);
}

#[test]
fn print_level_routes_info_to_out() {
    let (out, err, target) = buffers();
    let config = CaptureConfig {
        print_level: Some(Level::Debug),
        ..CaptureConfig::default()
    };
    let logger = TestLogger::with_target("printer", config, target);

    logger.log(Level::Trace.event("hidden"));
    logger.log(Level::Info.event("shown"));

    assert_eq!(text(&err), "");
    assert!(text(&out).ends_with(" INFO printer - shown\n"));
}

#[test]
fn nothing_printed_without_print_level() {
    let (out, err, target) = buffers();
    let logger = TestLogger::with_target("silent", CaptureConfig::default(), target);

    logger.log(Level::Error.event("captured only"));

    assert_eq!(logger.len(), 1);
    assert_eq!(text(&out), "");
    assert_eq!(text(&err), "");
}

#[test]
fn only_exact_crate_targets_are_ignored() {
    let logger = TestLogger::new("targets");
    let (total, captured) = capture(&logger, || {
        tracing::info!(target: "tracing_log_capture", "own root");
        tracing::info!(target: "tracing_log_capture::capture", "own module");
        tracing::info!(target: "tracing_log_capture_ext", "neighbour crate");
        tracing::info!(target: "tracing_log_capture_ext::db", "neighbour module");
    });

    let messages: Vec<String> = logger
        .events()
        .iter()
        .map(|e| e.message().to_string())
        .collect();
    assert_eq!(messages, vec!["neighbour crate", "neighbour module"]);
    assert_eq!((total, captured), (4, 2));
}
