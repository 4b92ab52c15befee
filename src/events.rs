use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use sentry_core::protocol::{Event, Map, Value};

use crate::exception::ExceptionProvider;
use crate::level::{convert_level, Level};
use crate::record::{Field, Record};
use crate::tags::TagExtractor;

/// The platform reported with events unless configured otherwise.
pub const DEFAULT_PLATFORM: &str = "native";

/// Creates events from records.
#[derive(Clone)]
pub(crate) struct Events {
    pub level: Level,
    pub platform: Cow<'static, str>,
    pub environment: Option<Cow<'static, str>>,
    pub tags: BTreeMap<String, String>,
    pub tag_extractor: TagExtractor,
    pub exception_provider: Arc<dyn ExceptionProvider>,
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("level", &self.level)
            .field("platform", &self.platform)
            .field("environment", &self.environment)
            .field("tags", &self.tags)
            .field("tag_extractor", &self.tag_extractor)
            .finish()
    }
}

impl Events {
    /// Returns `true` if a record at `level` is reported as an event.
    pub fn enabled(&self, level: Level) -> bool {
        self.level.enabled(level)
    }

    /// Creates the event for a record.
    ///
    /// `fields` are the fields of the logging call itself and are only used
    /// for tags; `extra` is the accumulated field data.
    pub fn create(
        &self,
        record: &Record,
        fields: &[Field],
        extra: Map<String, Value>,
    ) -> Event<'static> {
        let mut event = event_from_record(record, extra);
        event.platform = self.platform.clone();
        event.environment = self
            .environment
            .clone()
            .filter(|environment| !environment.is_empty());
        event.exception = self.exception_provider.exceptions(record).into();

        // configured tags take precedence over the ones from fields
        let mut tags = self.tag_extractor.extract(fields);
        tags.extend(self.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        event.tags = tags;
        event
    }
}

/// Creates a plain message [`Event`] from a [`Record`] and its accumulated
/// field data.
pub fn event_from_record(record: &Record, extra: Map<String, Value>) -> Event<'static> {
    Event {
        message: Some(record.message.clone()),
        timestamp: record.timestamp,
        level: convert_level(record.level),
        extra,
        ..Default::default()
    }
}
