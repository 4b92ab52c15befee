use sentry_core::protocol::{Breadcrumb, Map, Value};

use crate::level::{breadcrumb_category, breadcrumb_type, convert_level, Level};
use crate::record::Record;

/// Creates breadcrumbs from records.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Breadcrumbs {
    /// The threshold for breadcrumbs, `None` if they are disabled.
    pub level: Option<Level>,
    /// If `true`, calls without an explicit scope or hub do not record
    /// breadcrumbs.
    pub local_only: bool,
}

impl Default for Breadcrumbs {
    fn default() -> Self {
        Breadcrumbs {
            level: None,
            local_only: true,
        }
    }
}

impl Breadcrumbs {
    /// Returns `true` if breadcrumbs are enabled and `level` passes their
    /// threshold.
    pub fn enabled(&self, level: Level) -> bool {
        self.level.is_some_and(|threshold| threshold.enabled(level))
    }

    /// Returns `true` if a breadcrumb should be recorded for a record at
    /// `level`, given whether the call has an explicit scope or hub.
    pub fn should_record(&self, level: Level, explicit_context: bool) -> bool {
        self.enabled(level) && (explicit_context || !self.local_only)
    }

    pub fn create(&self, record: &Record, data: Map<String, Value>) -> Breadcrumb {
        breadcrumb_from_record(record, data)
    }
}

/// Creates a [`Breadcrumb`] from a [`Record`] and its accumulated field data.
pub fn breadcrumb_from_record(record: &Record, data: Map<String, Value>) -> Breadcrumb {
    Breadcrumb {
        timestamp: record.timestamp,
        ty: breadcrumb_type(record.level).into(),
        category: Some(breadcrumb_category(record.level).into()),
        level: convert_level(record.level),
        message: Some(record.message.clone()),
        data,
        ..Default::default()
    }
}
