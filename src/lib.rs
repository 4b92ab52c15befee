//! Routes structured log records to Sentry.
//!
//! This crate provides the [`SentryCore`], a sink that sits behind a
//! structured logging facade and turns log records into Sentry breadcrumbs
//! and events.  The facade talks to it through the [`Core`] trait: it asks
//! whether a level is [enabled](Core::enabled), derives cores carrying
//! context fields with [`with`](Core::with), and hands over each [`Record`]
//! together with its [`Field`]s.
//!
//! Records at or above the configured event level are captured as events,
//! with the accumulated fields as extra data, tags taken from registered
//! field keys, and an exception carrying the stacktrace of the logging call.
//! Records at or above the breadcrumb level are recorded as breadcrumbs.
//!
//! Breadcrumbs only land in an explicit scope by default.  A call chain gets
//! its own scope by deriving a core with [`Field::new_scope`], or reports
//! into a specific hub with [`Field::wrap_hub`]:
//!
//! ```
//! use std::sync::Arc;
//! use sentry_logcore::{CoreOptions, Field, Level, Record, SentryCore};
//!
//! let client = Arc::new(sentry_core::Client::from(sentry_core::ClientOptions::default()));
//! let options = CoreOptions::new().breadcrumbs(Level::INFO);
//! let core = SentryCore::from_client(client, options).unwrap();
//!
//! let request = core.with_fields(&[Field::new_scope(), Field::string("path", "/users/7")]);
//! request.write(&Record::new(Level::INFO, "recorded as breadcrumb"), &[]);
//! request.write(&Record::new(Level::ERROR, "recorded as event"), &[]);
//! ```
//!
//! Records above [`Level::ERROR`] flush the client before `write` returns.
//!
//! # Features
//!
//! * `slog`: a [`SentryDrain`] forwarding `slog` records through a core.

#![doc(html_favicon_url = "https://sentry-brand.storage.googleapis.com/favicon.ico")]
#![doc(html_logo_url = "https://sentry-brand.storage.googleapis.com/sentry-glyph-black.png")]
#![warn(missing_docs)]
#![deny(unsafe_code)]

#[macro_use]
mod macros;

mod breadcrumbs;
mod core;
#[cfg(feature = "slog")]
mod drain;
mod error;
mod events;
mod exception;
mod level;
mod options;
mod record;
mod scope;
mod stacktrace;
mod tags;

pub use crate::breadcrumbs::breadcrumb_from_record;
pub use crate::core::{Core, NoopCore, SentryCore};
#[cfg(feature = "slog")]
pub use crate::drain::{convert_slog_level, SentryDrain};
pub use crate::error::Error;
pub use crate::events::{event_from_record, DEFAULT_PLATFORM};
pub use crate::exception::{ExceptionProvider, NoopExceptionProvider, StacktraceExceptionProvider};
pub use crate::level::*;
pub use crate::options::{CoreOptions, HubProvider, DEFAULT_FLUSH_TIMEOUT};
pub use crate::record::{
    Caller, Field, FieldValue, ObjectValue, Record, Tagger, HUB_FIELD_KEY, SCOPE_FIELD_KEY,
};
pub use crate::scope::{ScopeHandle, MAX_BREADCRUMBS};
pub use crate::stacktrace::{DefaultFrameFilter, FrameFilter};
pub use crate::tags::TagExtractor;
