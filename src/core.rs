use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use im::OrdMap;
use sentry_core::protocol::{Breadcrumb, Event, Map, Value};
use sentry_core::types::Uuid;
use sentry_core::Client;

use crate::breadcrumbs::Breadcrumbs;
use crate::error::Error;
use crate::events::Events;
use crate::exception::{ExceptionProvider, NoopExceptionProvider, StacktraceExceptionProvider};
use crate::level::Level;
use crate::options::{CoreOptions, HubProvider};
use crate::record::{Field, FieldValue, Record};
use crate::scope::{
    capture_with_hub_scope, CaptureTarget, HubTrails, ScopeHandle, MAX_BREADCRUMBS,
};
use crate::stacktrace::{DefaultFrameFilter, FrameFilter};
use crate::tags::TagExtractor;

/// Records above this level flush the client before `write` returns.
const FLUSH_LEVEL: Level = Level::ERROR;

/// The contract a logging facade uses to hand records to a sink.
///
/// The facade asks [`enabled`](Core::enabled) before building a record, then
/// passes the record with its fields to [`write`](Core::write).  Loggers that
/// carry context call [`with`](Core::with) once and keep the derived core.
pub trait Core: Send + Sync {
    /// Returns `true` if records at `level` are of interest.
    fn enabled(&self, level: Level) -> bool;

    /// Returns a core that adds `fields` to everything written through it.
    fn with(&self, fields: &[Field]) -> Box<dyn Core>;

    /// Processes a record.
    fn write(&self, record: &Record, fields: &[Field]);

    /// Flushes buffered data.
    fn sync(&self);
}

/// A [`Core`] that discards everything.
///
/// Meant as a stand-in when a [`SentryCore`] could not be created.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCore;

impl Core for NoopCore {
    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn with(&self, _fields: &[Field]) -> Box<dyn Core> {
        Box::new(NoopCore)
    }

    fn write(&self, _record: &Record, _fields: &[Field]) {}

    fn sync(&self) {}
}

/// Configuration shared by a core and everything derived from it.
struct Shared {
    client: Arc<Client>,
    flush_timeout: Duration,
    breadcrumbs: Breadcrumbs,
    events: Events,
    default_hub: HubProvider,
    /// Breadcrumbs of calls without an explicit scope or hub.
    global_trail: ScopeHandle,
    hub_trails: HubTrails,
}

impl Shared {
    fn add_breadcrumb(&self, target: Option<&CaptureTarget>, breadcrumb: Breadcrumb) {
        let trail = match target {
            Some(CaptureTarget::Scope(scope)) => scope.clone(),
            Some(CaptureTarget::Hub(hub)) => self.hub_trails.get(hub),
            None => self.global_trail.clone(),
        };
        trail.add_breadcrumb(breadcrumb, MAX_BREADCRUMBS);
    }

    /// Captures an event.
    ///
    /// A hub reports through the client bound to it, anything else through
    /// the core's client.
    fn capture_event(
        &self,
        target: Option<&CaptureTarget>,
        mut event: Event<'static>,
    ) -> Uuid {
        match target {
            Some(CaptureTarget::Scope(scope)) => scope.capture_event(&self.client, event),
            Some(CaptureTarget::Hub(hub)) => {
                self.hub_trails.get(hub).attach_breadcrumbs(&mut event);
                match hub.client() {
                    Some(_) => hub.capture_event(event),
                    None => capture_with_hub_scope(hub, &self.client, event),
                }
            }
            None => {
                self.global_trail.attach_breadcrumbs(&mut event);
                capture_with_hub_scope(&(self.default_hub)(), &self.client, event)
            }
        }
    }
}

/// A [`Core`] that reports records to Sentry.
///
/// Every record that passes the event level is captured as an event; if
/// breadcrumbs are enabled, records passing the breadcrumb level are
/// recorded as breadcrumbs.  Records above [`Level::ERROR`] flush the client
/// before [`write`](Core::write) returns, so nothing is lost when the process
/// goes down right after.
///
/// Cores are cheap to clone.  [`with_fields`](SentryCore::with_fields) derives
/// a new core that shares the configuration and extends a persistent copy of
/// the accumulated fields; the parent is never modified.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sentry_logcore::{CoreOptions, Field, Level, Record, SentryCore};
///
/// let core = SentryCore::from_client(
///     Arc::new(sentry_core::Client::from(sentry_core::ClientOptions::default())),
///     CoreOptions::new().breadcrumbs(Level::INFO),
/// )
/// .unwrap();
///
/// let request = core.with_fields(&[Field::string("request_id", "abc"), Field::new_scope()]);
/// request.write(&Record::new(Level::INFO, "loading user"), &[]);
/// request.write(&Record::new(Level::ERROR, "user not found"), &[Field::value("user_id", 7)]);
/// ```
#[derive(Clone)]
pub struct SentryCore {
    shared: Arc<Shared>,
    target: Option<CaptureTarget>,
    fields: OrdMap<String, Value>,
}

impl fmt::Debug for SentryCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryCore")
            .field("flush_timeout", &self.shared.flush_timeout)
            .field("breadcrumbs", &self.shared.breadcrumbs)
            .field("events", &self.shared.events)
            .field("explicit_context", &self.target.is_some())
            .field("fields", &self.fields)
            .finish()
    }
}

impl SentryCore {
    /// Creates a core with a client from `factory`.
    ///
    /// Fails if the factory fails or the options are inconsistent.
    pub fn new<F, C, E>(factory: F, options: CoreOptions) -> Result<SentryCore, Error>
    where
        F: FnOnce() -> Result<C, E>,
        C: Into<Arc<Client>>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        validate(&options)?;
        let client = factory().map_err(|err| Error::ClientFactory(err.into()))?;
        Ok(SentryCore::build(client.into(), options))
    }

    /// Creates a core reporting through `client`.
    pub fn from_client(client: Arc<Client>, options: CoreOptions) -> Result<SentryCore, Error> {
        validate(&options)?;
        Ok(SentryCore::build(client, options))
    }

    fn build(client: Arc<Client>, options: CoreOptions) -> SentryCore {
        let exception_provider: Arc<dyn ExceptionProvider> = match options.exception_provider {
            Some(provider) => provider,
            None if options.attach_stacktrace => {
                let frame_filter: Arc<dyn FrameFilter> = match options.frame_filter {
                    Some(filter) => filter,
                    None => Arc::new(DefaultFrameFilter::default()),
                };
                Arc::new(StacktraceExceptionProvider::new(frame_filter))
            }
            None => Arc::new(NoopExceptionProvider),
        };

        let shared = Shared {
            client,
            flush_timeout: options.flush_timeout,
            breadcrumbs: Breadcrumbs {
                level: options.breadcrumb_level,
                local_only: !options.global_breadcrumbs,
            },
            events: Events {
                level: options.level,
                platform: options.platform,
                environment: options.environment,
                tags: options.tags,
                tag_extractor: TagExtractor::new(options.tag_keys),
                exception_provider,
            },
            default_hub: options.default_hub,
            global_trail: ScopeHandle::new(),
            hub_trails: HubTrails::default(),
        };

        SentryCore {
            shared: Arc::new(shared),
            target: options.hub.map(CaptureTarget::Hub),
            fields: OrdMap::new(),
        }
    }

    /// Returns the client this core reports through.
    pub fn client(&self) -> &Arc<Client> {
        &self.shared.client
    }

    /// Returns `true` if records at `level` become events or breadcrumbs.
    pub fn enabled(&self, level: Level) -> bool {
        self.shared.events.enabled(level) || self.shared.breadcrumbs.enabled(level)
    }

    /// Returns the accumulated field data of this core.
    pub fn fields(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Derives a core with `fields` added to the accumulated fields.
    ///
    /// On key collisions the new field wins.  A scope or hub marker among
    /// `fields` becomes the explicit context of the derived core.
    pub fn with_fields(&self, fields: &[Field]) -> SentryCore {
        let mut merged = self.fields.clone();
        for field in fields {
            if let Some(value) = field.value.to_value() {
                merged.insert(field.key.to_string(), value);
            }
        }

        SentryCore {
            shared: self.shared.clone(),
            target: find_target(fields).or_else(|| self.target.clone()),
            fields: merged,
        }
    }

    /// Processes a record.
    ///
    /// Never fails; anything Sentry rejects is dropped.
    pub fn write(&self, record: &Record, fields: &[Field]) {
        let clone = self.with_fields(fields);

        let breadcrumbs = &self.shared.breadcrumbs;
        if breadcrumbs.should_record(record.level, clone.target.is_some()) {
            let breadcrumb = breadcrumbs.create(record, clone.fields());
            self.shared.add_breadcrumb(clone.target.as_ref(), breadcrumb);
        } else if breadcrumbs.enabled(record.level) {
            sentry_debug!("skipped breadcrumb for call without explicit scope");
        }

        if self.shared.events.enabled(record.level) {
            let event = self.shared.events.create(record, fields, clone.fields());
            let event_id = self.shared.capture_event(clone.target.as_ref(), event);
            if event_id.is_nil() {
                sentry_debug!("event was dropped by the client");
            }
        }

        // the process may be about to go down, get buffered events out
        if record.level > FLUSH_LEVEL {
            self.sync();
        }
    }

    /// Flushes the client, blocking for at most the configured timeout.
    pub fn sync(&self) {
        self.flush(self.shared.flush_timeout);
    }

    /// Flushes the client, blocking for at most `timeout`.
    ///
    /// Returns `false` if not everything could be sent in time.
    pub fn flush(&self, timeout: Duration) -> bool {
        let flushed = self.shared.client.flush(Some(timeout));
        if !flushed {
            sentry_warn!("flush did not complete within {:?}", timeout);
        }
        flushed
    }
}

impl Core for SentryCore {
    fn enabled(&self, level: Level) -> bool {
        SentryCore::enabled(self, level)
    }

    fn with(&self, fields: &[Field]) -> Box<dyn Core> {
        Box::new(self.with_fields(fields))
    }

    fn write(&self, record: &Record, fields: &[Field]) {
        SentryCore::write(self, record, fields)
    }

    fn sync(&self) {
        SentryCore::sync(self)
    }
}

fn validate(options: &CoreOptions) -> Result<(), Error> {
    options.validate().map_err(|err| {
        sentry_warn!("rejected core options: {}", err);
        err
    })
}

/// Returns the context of the first scope or hub marker.
fn find_target(fields: &[Field]) -> Option<CaptureTarget> {
    fields.iter().find_map(|field| match field.value {
        FieldValue::Scope(ref scope) => Some(CaptureTarget::Scope(scope.clone())),
        FieldValue::Hub(ref hub) => Some(CaptureTarget::Hub(hub.clone())),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(options: CoreOptions) -> SentryCore {
        let client = Arc::new(Client::from(sentry_core::ClientOptions::default()));
        SentryCore::from_client(client, options).unwrap()
    }

    #[test]
    fn test_enabled() {
        let events_only = core(CoreOptions::new());
        assert!(events_only.enabled(Level::ERROR));
        assert!(!events_only.enabled(Level::WARN));

        let with_breadcrumbs = core(CoreOptions::new().breadcrumbs(Level::INFO));
        assert!(with_breadcrumbs.enabled(Level::INFO));
        assert!(!with_breadcrumbs.enabled(Level::DEBUG));
        assert!(!NoopCore.enabled(Level::FATAL));
    }

    #[test]
    fn test_with_fields_does_not_touch_parent() {
        let parent = core(CoreOptions::new()).with_fields(&[Field::string("service", "api")]);
        let left = parent.with_fields(&[Field::string("left", "1")]);
        let right = parent.with_fields(&[
            Field::string("right", "2"),
            Field::string("service", "worker"),
        ]);

        assert_eq!(parent.fields().len(), 1);
        assert_eq!(left.fields()["service"], "api");
        assert!(!left.fields().contains_key("right"));
        assert!(!right.fields().contains_key("left"));
        assert_eq!(right.fields()["service"], "worker");
        assert_eq!(parent.fields()["service"], "api");
    }

    #[test]
    fn test_markers_set_target() {
        let parent = core(CoreOptions::new());
        assert!(parent.target.is_none());

        let scope = ScopeHandle::new();
        let child =
            parent.with_fields(&[Field::string("a", "b"), Field::wrap_scope(scope.clone())]);
        assert!(matches!(child.target, Some(CaptureTarget::Scope(ref s)) if s.ptr_eq(&scope)));
        assert!(!child.fields().contains_key(crate::record::SCOPE_FIELD_KEY));

        let grandchild = child.with_fields(&[Field::string("c", "d")]);
        assert!(matches!(grandchild.target, Some(CaptureTarget::Scope(ref s)) if s.ptr_eq(&scope)));

        let other = ScopeHandle::new();
        let first_wins =
            parent.with_fields(&[Field::wrap_scope(other.clone()), Field::wrap_scope(scope)]);
        assert!(matches!(first_wins.target, Some(CaptureTarget::Scope(ref s)) if s.ptr_eq(&other)));
    }

    #[test]
    fn test_boxed_core() {
        let core: Box<dyn Core> = Box::new(core(CoreOptions::new()));
        let derived = core.with(&[Field::string("a", "b")]);
        assert!(derived.enabled(Level::ERROR));
        derived.write(&Record::new(Level::ERROR, "dropped, client has no dsn"), &[]);
        derived.sync();
    }
}
