use tracing::{error, info, info_span};

use tracing_log_capture::{init_capture, CaptureConfig, Level, TestLogger};

/// Captures a few `tracing` events and checks them the way a test would,
/// echoing WARN and above as they arrive.
fn main() -> Result<(), tracing_log_capture::Error> {
    let config = CaptureConfig {
        print_level: Some(Level::Warn),
        ..CaptureConfig::from_env()
    };
    let logger = TestLogger::with_config("checkout", config);
    init_capture(logger.clone())?;

    let span = info_span!("request", request_id = "r-42");
    let _guard = span.enter();

    info!(user = "alice", "basket loaded");
    error!(marker = "PAYMENT", "card declined");

    let expected = Level::Info
        .event("basket loaded")
        .context_entry("request_id", "r-42")
        .context_entry("user", "alice")
        .build();

    let events = logger.events();
    println!("captured {} events", events.len());
    println!("first matches expectation: {}", events[0] == expected);
    for event in &events {
        println!("{}", event);
    }
    Ok(())
}
