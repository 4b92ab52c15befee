/// Emits an internal diagnostic through the `log` facade.
///
/// Everything the core swallows (dropped events, flush timeouts, skipped
/// breadcrumbs) is reported here instead of to the logging call site.
macro_rules! sentry_debug {
    ($($arg:tt)*) => {
        ::log::debug!(target: "sentry_logcore", $($arg)*)
    };
}

/// Like `sentry_debug!`, but for conditions an operator should notice.
macro_rules! sentry_warn {
    ($($arg:tt)*) => {
        ::log::warn!(target: "sentry_logcore", $($arg)*)
    };
}
