use std::sync::Arc;

use sentry_backtrace::current_stacktrace;
use sentry_core::protocol::Exception;

use crate::record::Record;
use crate::stacktrace::{DefaultFrameFilter, FrameFilter};

/// Provides the exceptions reported with an event for a [`Record`].
///
/// Sentry models exceptions as a list; a provider returns either a single
/// exception or an empty list when it has nothing to report.
pub trait ExceptionProvider: Send + Sync {
    /// Returns the exceptions for the record.
    fn exceptions(&self, record: &Record) -> Vec<Exception>;
}

/// An [`ExceptionProvider`] that never reports an exception.
///
/// This is used when stacktraces are disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopExceptionProvider;

impl ExceptionProvider for NoopExceptionProvider {
    fn exceptions(&self, _record: &Record) -> Vec<Exception> {
        Vec::new()
    }
}

/// An [`ExceptionProvider`] that reports the stack of the logging call.
///
/// The exception type is the log message and its value the trimmed caller
/// location.  The stack is captured when the event is built and passed
/// through a [`FrameFilter`] so it ends at the application's logging call.
#[derive(Clone)]
pub struct StacktraceExceptionProvider {
    frame_filter: Arc<dyn FrameFilter>,
}

impl Default for StacktraceExceptionProvider {
    fn default() -> Self {
        Self::new(Arc::new(DefaultFrameFilter::default()))
    }
}

impl StacktraceExceptionProvider {
    /// Creates a provider using the given frame filter.
    pub fn new(frame_filter: Arc<dyn FrameFilter>) -> Self {
        StacktraceExceptionProvider { frame_filter }
    }
}

impl ExceptionProvider for StacktraceExceptionProvider {
    fn exceptions(&self, record: &Record) -> Vec<Exception> {
        let mut stacktrace = match current_stacktrace() {
            Some(stacktrace) => stacktrace,
            None => {
                sentry_debug!("no stacktrace available, reporting event without exception");
                return NoopExceptionProvider.exceptions(record);
            }
        };
        let frames = std::mem::take(&mut stacktrace.frames);
        stacktrace.frames = self.frame_filter.filter_frames(frames);

        vec![Exception {
            ty: record.message.clone(),
            value: record.caller.as_ref().map(|caller| caller.trimmed_path()),
            stacktrace: Some(stacktrace),
            ..Default::default()
        }]
    }
}
