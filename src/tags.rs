use std::collections::{BTreeMap, HashSet};

use sentry_core::protocol::Value;

use crate::record::{Field, FieldValue};

/// Turns the fields of a record into event tags.
///
/// Only fields whose key was registered take part.  A registered string
/// field becomes a tag under its own key; a registered object that exposes
/// [`Tagger`](crate::Tagger) contributes all of its tags.  Everything else is
/// ignored here and only ends up in the event's extra data.  When several
/// fields produce the same tag, the later field wins.
#[derive(Clone, Debug, Default)]
pub struct TagExtractor {
    keys: HashSet<String>,
}

impl TagExtractor {
    /// Creates an extractor for the given field keys.
    pub fn new<I, K>(keys: I) -> TagExtractor
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        TagExtractor {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if fields with this key are converted into tags.
    pub fn is_registered(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Extracts the tags from the given fields.
    pub fn extract(&self, fields: &[Field]) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        if self.keys.is_empty() {
            return tags;
        }
        for field in fields {
            if !self.is_registered(&field.key) {
                continue;
            }
            match field.value {
                FieldValue::Str(ref value) | FieldValue::Value(Value::String(ref value)) => {
                    tags.insert(field.key.to_string(), value.clone());
                }
                FieldValue::Object(ref object) => {
                    if let Some(tagger) = object.as_tagger() {
                        tags.extend(tagger.tags());
                    }
                }
                _ => {}
            }
        }
        tags
    }
}
