use std::fmt;

use sentry_core::Level as SentryLevel;

/// Breadcrumb type used for records without a more specific type.
///
/// See <https://develop.sentry.dev/sdk/event-payloads/breadcrumbs/#breadcrumb-types>
pub const BREADCRUMB_TYPE_DEFAULT: &str = "default";
/// Breadcrumb type used for `INFO` records.
pub const BREADCRUMB_TYPE_INFO: &str = "info";
/// Breadcrumb type used for `DEBUG` records.
pub const BREADCRUMB_TYPE_DEBUG: &str = "debug";

/// Breadcrumb category for informational records.
pub const BREADCRUMB_CATEGORY_LOG: &str = "log";
/// Breadcrumb category for warnings.
pub const BREADCRUMB_CATEGORY_WARNING: &str = "warning";
/// Breadcrumb category for errors and everything louder.
pub const BREADCRUMB_CATEGORY_ERROR: &str = "error";

/// The severity of a log record.
///
/// Levels form an ordered scale where a larger value is louder.  The named
/// constants cover the scale used by the logging facade, but any `i8` can be
/// turned into a level; values outside of the mapping tables get the most
/// severe mapping.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i8);

impl Level {
    /// Very verbose diagnostics.
    pub const TRACE: Level = Level(-2);
    /// Debugging output.
    pub const DEBUG: Level = Level(-1);
    /// Regular operational messages.
    pub const INFO: Level = Level(0);
    /// Something unexpected that the application recovered from.
    pub const WARN: Level = Level(1);
    /// An error the application should know about.
    pub const ERROR: Level = Level(2);
    /// A critical error; the process is likely about to go down.
    pub const CRITICAL: Level = Level(3);
    /// The logging call is followed by a panic.
    pub const PANIC: Level = Level(4);
    /// The logging call is followed by process termination.
    pub const FATAL: Level = Level(5);

    /// Creates a level from its raw value.
    pub const fn from_i8(value: i8) -> Level {
        Level(value)
    }

    /// Returns the raw value of this level.
    pub const fn as_i8(self) -> i8 {
        self.0
    }

    /// Returns `true` if a record at `level` passes a threshold of `self`.
    pub fn enabled(self, level: Level) -> bool {
        level >= self
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
            Level::CRITICAL => "critical",
            Level::PANIC => "panic",
            Level::FATAL => "fatal",
            _ => return None,
        })
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Level({})", name),
            None => write!(f, "Level({})", self.0),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "level({})", self.0),
        }
    }
}

/// Converts a [`Level`] to a Sentry [`Level`](SentryLevel).
///
/// Levels that are not part of the mapping are treated as `Fatal`.
pub fn convert_level(level: Level) -> SentryLevel {
    match level {
        Level::TRACE | Level::DEBUG => SentryLevel::Debug,
        Level::INFO => SentryLevel::Info,
        Level::WARN => SentryLevel::Warning,
        Level::ERROR => SentryLevel::Error,
        _ => SentryLevel::Fatal,
    }
}

/// Returns the breadcrumb type for a [`Level`].
pub fn breadcrumb_type(level: Level) -> &'static str {
    match level {
        Level::DEBUG => BREADCRUMB_TYPE_DEBUG,
        Level::INFO => BREADCRUMB_TYPE_INFO,
        _ => BREADCRUMB_TYPE_DEFAULT,
    }
}

/// Returns the breadcrumb category for a [`Level`].
pub fn breadcrumb_category(level: Level) -> &'static str {
    match level {
        Level::TRACE | Level::DEBUG | Level::INFO => BREADCRUMB_CATEGORY_LOG,
        Level::WARN => BREADCRUMB_CATEGORY_WARNING,
        _ => BREADCRUMB_CATEGORY_ERROR,
    }
}
