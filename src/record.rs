//! Types at the boundary to the logging facade.
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::SystemTime;

use sentry_core::protocol::Value;
use sentry_core::Hub;

use crate::level::Level;
use crate::scope::ScopeHandle;

/// Key of the marker field carrying a [`ScopeHandle`].
pub const SCOPE_FIELD_KEY: &str = "_sentry_scope_";
/// Key of the marker field carrying a [`Hub`].
pub const HUB_FIELD_KEY: &str = "_sentry_hub_";

/// The source location a record was emitted from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    /// Path of the source file.
    pub file: Cow<'static, str>,
    /// Line in the source file.
    pub line: u32,
}

impl Caller {
    /// Creates a caller from a [`Location`].
    pub fn from_location(location: &'static Location<'static>) -> Caller {
        Caller {
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }

    /// Returns the file path trimmed to its last directory and file name,
    /// followed by the line number.
    ///
    /// ```
    /// # use sentry_logcore::Caller;
    /// let caller = Caller {
    ///     file: "/home/app/src/handlers/user.rs".into(),
    ///     line: 42,
    /// };
    /// assert_eq!(caller.trimmed_path(), "handlers/user.rs:42");
    /// ```
    pub fn trimmed_path(&self) -> String {
        let file: &str = &self.file;
        let mut separators = file.rmatch_indices(&['/', '\\'][..]);
        let trimmed = match (separators.next(), separators.next()) {
            (Some(_), Some((idx, _))) => &file[idx + 1..],
            _ => file,
        };
        format!("{}:{}", trimmed, self.line)
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single log entry as handed over by the logging facade.
#[derive(Clone, Debug)]
pub struct Record {
    /// The formatted log message.
    pub message: String,
    /// The severity of the entry.
    pub level: Level,
    /// When the entry was emitted.
    pub timestamp: SystemTime,
    /// Where the entry was emitted from.
    pub caller: Option<Caller>,
}

impl Record {
    /// Creates a record timestamped now, with the caller of this function
    /// as its source location.
    #[track_caller]
    pub fn new<M: Into<String>>(level: Level, message: M) -> Record {
        Record {
            message: message.into(),
            level,
            timestamp: SystemTime::now(),
            caller: Some(Caller::from_location(Location::caller())),
        }
    }
}

/// A type that contributes its own tags when logged as a field.
pub trait Tagger {
    /// Returns the tags of this value.
    fn tags(&self) -> BTreeMap<String, String>;
}

/// An arbitrary value attached to a record.
///
/// Objects are converted to a [`Value`] for the extra data of events and
/// breadcrumbs.  Objects that also implement [`Tagger`] can expose that
/// through [`as_tagger`](ObjectValue::as_tagger) to take part in tag
/// extraction.
pub trait ObjectValue: Send + Sync {
    /// Converts the object into its structured representation.
    fn to_value(&self) -> Value;

    /// Returns the tag capability of this object, if it has one.
    fn as_tagger(&self) -> Option<&dyn Tagger> {
        None
    }
}

/// The value of a [`Field`].
#[derive(Clone)]
pub enum FieldValue {
    /// A plain string.
    Str(String),
    /// Arbitrary structured data.
    Value(Value),
    /// An opaque object.
    Object(Arc<dyn ObjectValue>),
    /// Marker carrying an explicit scope for the call.
    Scope(ScopeHandle),
    /// Marker carrying an explicit hub for the call.
    Hub(Arc<Hub>),
}

impl FieldValue {
    /// Returns the structured form of the value.
    ///
    /// Markers have no structured form and return `None`.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            FieldValue::Str(s) => Some(Value::String(s.clone())),
            FieldValue::Value(v) => Some(v.clone()),
            FieldValue::Object(obj) => Some(obj.to_value()),
            FieldValue::Scope(_) | FieldValue::Hub(_) => None,
        }
    }

    /// Returns `true` for scope and hub markers.
    pub fn is_marker(&self) -> bool {
        matches!(self, FieldValue::Scope(_) | FieldValue::Hub(_))
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            FieldValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            FieldValue::Object(obj) => f.debug_tuple("Object").field(&obj.to_value()).finish(),
            FieldValue::Scope(_) => f.write_str("Scope(..)"),
            FieldValue::Hub(_) => f.write_str("Hub(..)"),
        }
    }
}

/// A key/value pair attached to a record or to a derived core.
#[derive(Clone, Debug)]
pub struct Field {
    /// The key of the field.
    pub key: Cow<'static, str>,
    /// The value of the field.
    pub value: FieldValue,
}

impl Field {
    /// Creates a string field.
    pub fn string<K, V>(key: K, value: V) -> Field
    where
        K: Into<Cow<'static, str>>,
        V: Into<String>,
    {
        Field {
            key: key.into(),
            value: FieldValue::Str(value.into()),
        }
    }

    /// Creates a field with structured data.
    pub fn value<K, V>(key: K, value: V) -> Field
    where
        K: Into<Cow<'static, str>>,
        V: Into<Value>,
    {
        Field {
            key: key.into(),
            value: FieldValue::Value(value.into()),
        }
    }

    /// Creates a field holding an opaque object.
    pub fn object<K, O>(key: K, object: O) -> Field
    where
        K: Into<Cow<'static, str>>,
        O: ObjectValue + 'static,
    {
        Field {
            key: key.into(),
            value: FieldValue::Object(Arc::new(object)),
        }
    }

    /// Creates an `error` field from the display form of an error.
    pub fn error(err: &dyn Error) -> Field {
        Field::string("error", err.to_string())
    }

    /// Creates a marker field with a fresh, empty scope.
    ///
    /// Logging with this marker isolates the breadcrumbs of the call chain
    /// from every other chain.
    pub fn new_scope() -> Field {
        Field::wrap_scope(ScopeHandle::new())
    }

    /// Creates a marker field for an existing scope.
    pub fn wrap_scope(scope: ScopeHandle) -> Field {
        Field {
            key: Cow::Borrowed(SCOPE_FIELD_KEY),
            value: FieldValue::Scope(scope),
        }
    }

    /// Creates a marker field for a hub.
    pub fn wrap_hub(hub: Arc<Hub>) -> Field {
        Field {
            key: Cow::Borrowed(HUB_FIELD_KEY),
            value: FieldValue::Hub(hub),
        }
    }
}
