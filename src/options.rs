use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sentry_core::Hub;

use crate::error::Error;
use crate::events::DEFAULT_PLATFORM;
use crate::exception::ExceptionProvider;
use crate::level::Level;
use crate::stacktrace::FrameFilter;

/// The flush timeout used unless configured otherwise.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Provides the hub used by calls without an explicit scope or hub.
pub type HubProvider = Arc<dyn Fn() -> Arc<Hub> + Send + Sync>;

/// Configuration of a [`SentryCore`](crate::SentryCore).
///
/// By default records at [`Level::ERROR`] and above become events with a
/// stacktrace attached, breadcrumbs are disabled, and calls without an
/// explicit context use [`Hub::current`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sentry_logcore::{CoreOptions, Level};
///
/// let options = CoreOptions::new()
///     .breadcrumbs(Level::INFO)
///     .flush_timeout(Duration::from_secs(2))
///     .environment("production")
///     .tag("service", "billing")
///     .tag_keys(["tenant"]);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct CoreOptions {
    pub(crate) level: Level,
    pub(crate) breadcrumb_level: Option<Level>,
    pub(crate) global_breadcrumbs: bool,
    pub(crate) flush_timeout: Duration,
    pub(crate) platform: Cow<'static, str>,
    pub(crate) environment: Option<Cow<'static, str>>,
    pub(crate) attach_stacktrace: bool,
    pub(crate) frame_filter: Option<Arc<dyn FrameFilter>>,
    pub(crate) exception_provider: Option<Arc<dyn ExceptionProvider>>,
    pub(crate) tags: BTreeMap<String, String>,
    pub(crate) tag_keys: Vec<String>,
    pub(crate) hub: Option<Arc<Hub>>,
    pub(crate) default_hub: HubProvider,
}

impl Default for CoreOptions {
    fn default() -> Self {
        CoreOptions {
            level: Level::ERROR,
            breadcrumb_level: None,
            global_breadcrumbs: false,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            platform: Cow::Borrowed(DEFAULT_PLATFORM),
            environment: None,
            attach_stacktrace: true,
            frame_filter: None,
            exception_provider: None,
            tags: BTreeMap::new(),
            tag_keys: Vec::new(),
            hub: None,
            default_hub: Arc::new(Hub::current),
        }
    }
}

impl fmt::Debug for CoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct Custom;

        f.debug_struct("CoreOptions")
            .field("level", &self.level)
            .field("breadcrumb_level", &self.breadcrumb_level)
            .field("global_breadcrumbs", &self.global_breadcrumbs)
            .field("flush_timeout", &self.flush_timeout)
            .field("platform", &self.platform)
            .field("environment", &self.environment)
            .field("attach_stacktrace", &self.attach_stacktrace)
            .field("frame_filter", &self.frame_filter.as_ref().map(|_| Custom))
            .field(
                "exception_provider",
                &self.exception_provider.as_ref().map(|_| Custom),
            )
            .field("tags", &self.tags)
            .field("tag_keys", &self.tag_keys)
            .field("hub", &self.hub.as_ref().map(|_| Custom))
            .finish()
    }
}

impl CoreOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level from which records are reported as events.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enables breadcrumbs for records at `level` and above.
    ///
    /// Unless [`global_breadcrumbs`](Self::global_breadcrumbs) is set, only
    /// calls with an explicit scope or hub record breadcrumbs.
    #[must_use]
    pub fn breadcrumbs(mut self, level: Level) -> Self {
        self.breadcrumb_level = Some(level);
        self
    }

    /// Also records breadcrumbs for calls without an explicit scope or hub.
    ///
    /// They are kept by the core and attached to events captured without an
    /// explicit scope or hub.
    #[must_use]
    pub fn global_breadcrumbs(mut self) -> Self {
        self.global_breadcrumbs = true;
        self
    }

    /// Sets how long a flush may block.
    #[must_use]
    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Sets the platform reported with events.
    #[must_use]
    pub fn platform<P: Into<Cow<'static, str>>>(mut self, platform: P) -> Self {
        self.platform = platform.into();
        self
    }

    /// Sets the environment reported with events.
    ///
    /// An empty environment is not reported.
    #[must_use]
    pub fn environment<E: Into<Cow<'static, str>>>(mut self, environment: E) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Stops attaching a stacktrace to events.
    #[must_use]
    pub fn disable_stacktrace(mut self) -> Self {
        self.attach_stacktrace = false;
        self
    }

    /// Sets the filter applied to captured stacktraces.
    #[must_use]
    pub fn frame_filter<F: FrameFilter + 'static>(mut self, filter: F) -> Self {
        self.frame_filter = Some(Arc::new(filter));
        self
    }

    /// Replaces the way exceptions are attached to events.
    ///
    /// A custom provider takes precedence over the stacktrace settings.
    #[must_use]
    pub fn exception_provider<P: ExceptionProvider + 'static>(mut self, provider: P) -> Self {
        self.exception_provider = Some(Arc::new(provider));
        self
    }

    /// Adds a tag to every event.
    ///
    /// Configured tags win over tags extracted from fields.
    #[must_use]
    pub fn tag<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Adds tags to every event.
    #[must_use]
    pub fn tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Registers field keys that are turned into event tags.
    #[must_use]
    pub fn tag_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.tag_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Reports to this hub instead of the default hub.
    #[must_use]
    pub fn hub(mut self, hub: Arc<Hub>) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Sets the provider of the hub used when no explicit scope or hub is
    /// given.  Defaults to [`Hub::current`].
    #[must_use]
    pub fn default_hub<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Arc<Hub> + Send + Sync + 'static,
    {
        self.default_hub = Arc::new(provider);
        self
    }

    /// Checks the options for consistency.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(breadcrumbs) = self.breadcrumb_level {
            if breadcrumbs > self.level {
                return Err(Error::BreadcrumbLevelTooHigh {
                    breadcrumbs,
                    events: self.level,
                });
            }
        }
        if self.flush_timeout.is_zero() {
            return Err(Error::ZeroFlushTimeout);
        }
        if !self.attach_stacktrace && self.frame_filter.is_some() {
            return Err(Error::FrameFilterWithoutStacktrace);
        }
        Ok(())
    }
}
