use std::borrow::Cow;
use std::fmt;

use sentry_core::protocol::Frame;

/// Function prefixes of the frames that belong to this crate or to the
/// logging facades it is plugged into.
const WELL_KNOWN_INTERNAL_PREFIXES: &[&str] = &["sentry_logcore::", "slog::"];

/// Filters the frames of a captured stacktrace.
///
/// Frames are passed in the order they are stored in a Sentry
/// [`Stacktrace`](sentry_core::protocol::Stacktrace): the outermost caller
/// first and the frame that captured the stack last.
pub trait FrameFilter: Send + Sync {
    /// Returns the frames that should be reported.
    fn filter_frames(&self, frames: Vec<Frame>) -> Vec<Frame>;
}

impl<F> FrameFilter for F
where
    F: Fn(Vec<Frame>) -> Vec<Frame> + Send + Sync,
{
    fn filter_frames(&self, frames: Vec<Frame>) -> Vec<Frame> {
        self(frames)
    }
}

/// The default [`FrameFilter`].
///
/// Walks the frames from the outermost caller and cuts the stacktrace at the
/// first frame that belongs to this crate or to the logging facade, so the
/// reported stack ends at the application's logging call.  Frames inside of
/// `tests` modules (or modules with a `_test` suffix) are never treated as
/// internal.
#[derive(Clone)]
pub struct DefaultFrameFilter {
    internal_prefixes: Vec<Cow<'static, str>>,
}

impl Default for DefaultFrameFilter {
    fn default() -> Self {
        DefaultFrameFilter {
            internal_prefixes: WELL_KNOWN_INTERNAL_PREFIXES
                .iter()
                .map(|prefix| Cow::Borrowed(*prefix))
                .collect(),
        }
    }
}

impl fmt::Debug for DefaultFrameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.internal_prefixes).finish()
    }
}

impl DefaultFrameFilter {
    /// Creates the default filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds another function prefix whose frames are treated as internal,
    /// for instance the module of an application's own logging wrapper.
    #[must_use]
    pub fn internal_prefix<P: Into<Cow<'static, str>>>(mut self, prefix: P) -> Self {
        self.internal_prefixes.push(prefix.into());
        self
    }

    fn is_internal(&self, frame: &Frame) -> bool {
        let module = frame_module(frame);
        if module.is_some_and(is_test_module) {
            return false;
        }
        self.internal_prefixes.iter().any(|prefix| {
            frame
                .function
                .as_deref()
                .is_some_and(|func| function_starts_with(func, prefix))
                || module.is_some_and(|module| function_starts_with(module, prefix))
        })
    }
}

impl FrameFilter for DefaultFrameFilter {
    fn filter_frames(&self, mut frames: Vec<Frame>) -> Vec<Frame> {
        if let Some(cutoff) = frames.iter().position(|frame| self.is_internal(frame)) {
            frames.truncate(cutoff);
        }
        frames
    }
}

/// Returns the module of a frame, deriving it from the function name when
/// the frame has no explicit module.
fn frame_module(frame: &Frame) -> Option<&str> {
    if let Some(ref module) = frame.module {
        return Some(module);
    }
    let func = frame.function.as_deref()?;
    func.rsplit_once("::").map(|(module, _)| module)
}

fn is_test_module(module: &str) -> bool {
    module
        .split("::")
        .any(|segment| segment == "tests" || segment.ends_with("_test"))
}

/// Checks whether the function name starts with the given pattern.
///
/// In trait implementations the type name is wrapped in `<...>` (or `_<...>`
/// in some symbol manglings), which is skipped.  Dots are accepted in place
/// of colons.
fn function_starts_with(func_name: &str, pattern: &str) -> bool {
    let func_name = func_name.trim_start_matches("_<").trim_start_matches('<');
    if func_name.len() < pattern.len() {
        return false;
    }
    func_name
        .chars()
        .zip(pattern.chars())
        .all(|(f, p)| f == p || f == '.' && p == ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(function: &str) -> Frame {
        Frame {
            function: Some(function.into()),
            ..Default::default()
        }
    }

    fn functions(frames: &[Frame]) -> Vec<&str> {
        frames
            .iter()
            .map(|frame| frame.function.as_deref().unwrap())
            .collect()
    }

    #[test]
    fn test_truncates_at_first_internal_frame() {
        let frames = vec![
            frame("std::rt::lang_start"),
            frame("app::main"),
            frame("sentry_logcore::core::SentryCore::write"),
            frame("slog::Logger::log"),
            frame("app::handler"),
        ];
        let filtered = DefaultFrameFilter::new().filter_frames(frames);
        assert_eq!(functions(&filtered), ["std::rt::lang_start", "app::main"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filter = DefaultFrameFilter::new();
        let frames = vec![
            frame("app::main"),
            frame("app::run"),
            frame("<sentry_logcore::core::SentryCore as sentry_logcore::core::Core>::write"),
        ];
        let once = filter.filter_frames(frames);
        let twice = filter.filter_frames(once.clone());
        assert_eq!(once, twice);
        assert_eq!(functions(&twice), ["app::main", "app::run"]);
    }

    #[test]
    fn test_keeps_test_module_frames() {
        let frames = vec![
            frame("sentry_logcore::core::tests::writes_event"),
            frame("sentry_logcore::core_test::helper"),
            frame("sentry_logcore::core::SentryCore::write"),
        ];
        let filtered = DefaultFrameFilter::new().filter_frames(frames);
        assert_eq!(
            functions(&filtered),
            [
                "sentry_logcore::core::tests::writes_event",
                "sentry_logcore::core_test::helper"
            ]
        );
    }

    #[test]
    fn test_explicit_module_is_used() {
        let frames = vec![
            frame("app::main"),
            Frame {
                function: Some("write".into()),
                module: Some("sentry_logcore::core".into()),
                ..Default::default()
            },
        ];
        let filtered = DefaultFrameFilter::new().filter_frames(frames);
        assert_eq!(functions(&filtered), ["app::main"]);
    }

    #[test]
    fn test_empty_and_custom_prefix() {
        let filter = DefaultFrameFilter::new().internal_prefix("app::logging::");
        assert!(filter.filter_frames(vec![]).is_empty());

        let frames = vec![frame("app::main"), frame("app::logging::log_error")];
        assert_eq!(functions(&filter.filter_frames(frames)), ["app::main"]);
    }

    #[test]
    fn test_closure_filter() {
        let filter = |frames: Vec<Frame>| frames.into_iter().take(1).collect::<Vec<_>>();
        let filtered = filter.filter_frames(vec![frame("a::b"), frame("c::d")]);
        assert_eq!(functions(&filtered), ["a::b"]);
    }

    #[test]
    fn test_function_starts_with() {
        assert!(function_starts_with("sentry_logcore::core::x", "sentry_logcore::"));
        assert!(function_starts_with("_<slog..Logger>::log", "slog::"));
        assert!(!function_starts_with("slo", "slog::"));
        assert!(!function_starts_with("app::slog::x", "slog::"));
    }
}
