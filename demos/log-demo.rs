use std::sync::Arc;
use std::time::Duration;

use sentry_core::{ClientOptions, Envelope, Transport};
use sentry_logcore::{CoreOptions, Field, Level, Record, SentryCore};

/// Prints captured events instead of sending them.
struct PrintTransport;

impl Transport for PrintTransport {
    fn send_envelope(&self, envelope: Envelope) {
        if let Some(event) = envelope.event() {
            log::info!(
                "event {}: {:?} with {} breadcrumbs, tags {:?}",
                event.event_id,
                event.message,
                event.breadcrumbs.len(),
                event.tags
            );
        }
    }

    fn flush(&self, _timeout: Duration) -> bool {
        log::info!("flushed");
        true
    }
}

fn main() {
    let mut log_builder = pretty_env_logger::formatted_builder();
    log_builder.parse_filters("info,sentry_logcore=debug");
    log_builder.init();

    let options = CoreOptions::new()
        .breadcrumbs(Level::INFO)
        .environment("demo")
        .tag("service", "log-demo")
        .tag_keys(["user"])
        .flush_timeout(Duration::from_secs(2));

    let core = SentryCore::new(
        || {
            let dsn = "https://public@sentry.invalid/1".parse::<sentry_core::types::Dsn>()?;
            Ok::<_, sentry_core::types::ParseDsnError>(Arc::new(sentry_core::Client::from(
                ClientOptions {
                    dsn: Some(dsn),
                    transport: Some(Arc::new(Arc::new(PrintTransport))),
                    ..Default::default()
                },
            )))
        },
        options,
    )
    .unwrap();

    let request = core.with_fields(&[Field::new_scope(), Field::string("user", "alice")]);

    request.write(&Record::new(Level::DEBUG, "System is booting"), &[]);
    request.write(&Record::new(Level::INFO, "System is booting"), &[]);
    request.write(&Record::new(Level::WARN, "System is warning"), &[]);
    request.write(
        &Record::new(Level::ERROR, "Holy shit everything is on fire!"),
        &[Field::value("temperature", 451)],
    );
    request.write(&Record::new(Level::FATAL, "Shutting down"), &[]);
}
