use std::error::Error as StdError;

use thiserror::Error;

use crate::level::Level;

/// Errors raised while setting up a [`SentryCore`](crate::SentryCore).
///
/// Once a core exists nothing it does reports an error; these only fail
/// construction.
#[derive(Debug, Error)]
pub enum Error {
    /// Breadcrumbs are configured to start at a louder level than events.
    #[error("breadcrumb level {breadcrumbs} must not be above event level {events}")]
    BreadcrumbLevelTooHigh {
        /// The configured breadcrumb level.
        breadcrumbs: Level,
        /// The configured event level.
        events: Level,
    },
    /// The flush timeout is zero.
    #[error("flush timeout can't be 0")]
    ZeroFlushTimeout,
    /// A frame filter was configured although stacktraces are disabled.
    #[error("stacktraces are disabled, a frame filter would never be used")]
    FrameFilterWithoutStacktrace,
    /// The client factory failed.
    #[error("failed to create sentry client")]
    ClientFactory(#[source] Box<dyn StdError + Send + Sync>),
}
