use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::SystemTime;

use serde_json::{Number, Value};
use slog::{Drain, OwnedKVList, Serializer, KV};

use crate::core::SentryCore;
use crate::level::Level;
use crate::record::{Caller, Field, Record};

/// Converts a [`slog::Level`] to a [`Level`].
pub fn convert_slog_level(level: slog::Level) -> Level {
    match level {
        slog::Level::Trace => Level::TRACE,
        slog::Level::Debug => Level::DEBUG,
        slog::Level::Info => Level::INFO,
        slog::Level::Warning => Level::WARN,
        slog::Level::Error => Level::ERROR,
        slog::Level::Critical => Level::CRITICAL,
    }
}

/// A Drain which passes all Records through a [`SentryCore`] before handing
/// them to the wrapped drain.
///
/// Logger values and the key/value pairs of the record become fields of the
/// call, with the record's own pairs taking precedence.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sentry_logcore::{CoreOptions, SentryCore, SentryDrain};
///
/// let client = Arc::new(sentry_core::Client::from(sentry_core::ClientOptions::default()));
/// let core = SentryCore::from_client(client, CoreOptions::new()).unwrap();
///
/// let drain = SentryDrain::new(core, slog::Discard);
/// let root = slog::Logger::root(drain, slog::o!("service" => "billing"));
/// slog::error!(root, "payment failed"; "order" => 17);
/// ```
pub struct SentryDrain<D: Drain> {
    // all shared state of a core sits behind poison-tolerant locks
    core: AssertUnwindSafe<SentryCore>,
    drain: D,
}

impl<D: Drain> SentryDrain<D> {
    /// Creates a new `SentryDrain`, wrapping a `slog::Drain`.
    pub fn new(core: SentryCore, drain: D) -> Self {
        Self {
            core: AssertUnwindSafe(core),
            drain,
        }
    }

    /// Returns the core records are written to.
    pub fn core(&self) -> &SentryCore {
        &self.core
    }
}

impl<D: Drain> slog::Drain for SentryDrain<D> {
    type Ok = D::Ok;
    type Err = D::Err;

    fn log(&self, record: &slog::Record, values: &OwnedKVList) -> Result<Self::Ok, Self::Err> {
        let level = convert_slog_level(record.level());
        if self.core.enabled(level) {
            let fields = collect_fields(record, values);
            self.core.write(&convert_record(record, level), &fields);
        }
        self.drain.log(record, values)
    }

    fn is_enabled(&self, level: slog::Level) -> bool {
        self.core.enabled(convert_slog_level(level)) || self.drain.is_enabled(level)
    }
}

fn convert_record(record: &slog::Record, level: Level) -> Record {
    Record {
        message: record.msg().to_string(),
        level,
        timestamp: SystemTime::now(),
        caller: Some(Caller {
            file: record.file().into(),
            line: record.line(),
        }),
    }
}

fn collect_fields(record: &slog::Record, values: &OwnedKVList) -> Vec<Field> {
    let mut serializer = FieldSerializer::default();
    // serializers only fail if they choose to, this one never does
    let _ = values.serialize(record, &mut serializer);
    let _ = record.kv().serialize(record, &mut serializer);
    serializer.fields
}

/// Collects key/value pairs as fields.
#[derive(Default)]
struct FieldSerializer {
    fields: Vec<Field>,
}

impl FieldSerializer {
    fn push(&mut self, key: slog::Key, value: Value) -> slog::Result {
        self.fields.push(Field::value(key.to_string(), value));
        Ok(())
    }

    fn push_number<V>(&mut self, key: slog::Key, value: V) -> slog::Result
    where
        Number: From<V>,
    {
        self.push(key, Value::Number(Number::from(value)))
    }
}

macro_rules! impl_number {
    ( $type:ty => $function_name:ident ) => {
        fn $function_name(&mut self, key: slog::Key, val: $type) -> slog::Result {
            self.push_number(key, val)
        }
    };
}

impl Serializer for FieldSerializer {
    fn emit_bool(&mut self, key: slog::Key, val: bool) -> slog::Result {
        self.push(key, Value::Bool(val))
    }

    fn emit_unit(&mut self, key: slog::Key) -> slog::Result {
        self.push(key, Value::Null)
    }

    fn emit_none(&mut self, key: slog::Key) -> slog::Result {
        self.push(key, Value::Null)
    }

    fn emit_char(&mut self, key: slog::Key, val: char) -> slog::Result {
        self.push(key, Value::String(val.to_string()))
    }

    fn emit_str(&mut self, key: slog::Key, val: &str) -> slog::Result {
        self.push(key, Value::String(val.to_owned()))
    }

    fn emit_f64(&mut self, key: slog::Key, val: f64) -> slog::Result {
        match Number::from_f64(val) {
            Some(num) => self.push(key, Value::Number(num)),
            None => self.push(key, Value::Null),
        }
    }

    impl_number!(u8 => emit_u8);
    impl_number!(i8 => emit_i8);
    impl_number!(u16 => emit_u16);
    impl_number!(i16 => emit_i16);
    impl_number!(u32 => emit_u32);
    impl_number!(i32 => emit_i32);
    impl_number!(u64 => emit_u64);
    impl_number!(i64 => emit_i64);
    impl_number!(usize => emit_usize);
    impl_number!(isize => emit_isize);

    fn emit_serde(&mut self, key: slog::Key, value: &dyn slog::SerdeValue) -> slog::Result {
        let value = serde_json::to_value(value.as_serde()).unwrap_or(Value::Null);
        self.push(key, value)
    }

    fn emit_arguments(&mut self, key: slog::Key, val: &fmt::Arguments) -> slog::Result {
        self.push(key, Value::String(val.to_string()))
    }
}
