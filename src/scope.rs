use std::collections::VecDeque;
use std::fmt;
use std::ptr;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use sentry_core::protocol::{Breadcrumb, Event};
use sentry_core::types::Uuid;
use sentry_core::{Client, Hub, Scope};

/// The number of breadcrumbs a [`ScopeHandle`] retains.
pub const MAX_BREADCRUMBS: usize = 1000;

#[derive(Default)]
struct ScopeState {
    scope: Scope,
    breadcrumbs: VecDeque<Breadcrumb>,
}

/// A shared, explicitly threaded Sentry scope.
///
/// Cloning a handle does not copy the scope; all clones refer to the same
/// scope data and the same breadcrumb trail.  Handles are attached to a
/// logging call through [`Field::wrap_scope`](crate::Field::wrap_scope) or
/// [`Field::new_scope`](crate::Field::new_scope), which keeps the breadcrumbs
/// of that call chain apart from everything else in the process.
///
/// Breadcrumbs are kept in a ring buffer of at most [`MAX_BREADCRUMBS`]
/// entries and are attached to every event captured through the handle.
#[derive(Clone, Default)]
pub struct ScopeHandle {
    inner: Arc<RwLock<ScopeState>>,
}

impl fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ScopeHandle")
            .field("breadcrumbs", &state.breadcrumbs.len())
            .finish()
    }
}

impl ScopeHandle {
    /// Creates a handle for a fresh, empty scope.
    pub fn new() -> ScopeHandle {
        ScopeHandle::default()
    }

    /// Creates a handle that starts out with the given scope data.
    pub fn from_scope(scope: Scope) -> ScopeHandle {
        ScopeHandle {
            inner: Arc::new(RwLock::new(ScopeState {
                scope,
                breadcrumbs: VecDeque::new(),
            })),
        }
    }

    /// Invokes a function that can modify the scope data (tags, user,
    /// contexts, ...).
    pub fn configure<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Scope) -> R,
    {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state.scope)
    }

    /// Appends a breadcrumb, dropping the oldest ones beyond `max`.
    pub fn add_breadcrumb(&self, breadcrumb: Breadcrumb, max: usize) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.breadcrumbs.push_back(breadcrumb);
        while state.breadcrumbs.len() > max {
            state.breadcrumbs.pop_front();
        }
    }

    /// Returns a snapshot of the recorded breadcrumbs, oldest first.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.breadcrumbs.iter().cloned().collect()
    }

    /// Deletes all recorded breadcrumbs.
    pub fn clear_breadcrumbs(&self) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.breadcrumbs.clear();
    }

    /// Returns `true` if both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &ScopeHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Appends the recorded breadcrumbs to an event.
    pub(crate) fn attach_breadcrumbs(&self, event: &mut Event<'static>) {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        event.breadcrumbs.extend(state.breadcrumbs.iter().cloned());
    }

    /// Captures an event through `client` with this scope applied.
    ///
    /// The lock is released before the event is handed to the client.
    pub(crate) fn capture_event(&self, client: &Client, mut event: Event<'static>) -> Uuid {
        self.attach_breadcrumbs(&mut event);
        let scope = self.configure(|scope| scope.clone());
        client.capture_event(event, Some(&scope))
    }
}

/// The context a single logging call reports to.
#[derive(Clone)]
pub(crate) enum CaptureTarget {
    /// An explicitly threaded scope.
    Scope(ScopeHandle),
    /// An explicitly threaded or configured hub.
    Hub(Arc<Hub>),
}

/// Breadcrumb trails kept per hub.
///
/// A hub's own scope caps breadcrumbs at its client's `max_breadcrumbs` and
/// drops them without a client, so the core records them here instead and
/// attaches them to events captured through that hub.
#[derive(Default)]
pub(crate) struct HubTrails {
    trails: Mutex<Vec<(Weak<Hub>, ScopeHandle)>>,
}

impl HubTrails {
    /// Returns the trail of `hub`, creating it on first use.
    pub(crate) fn get(&self, hub: &Arc<Hub>) -> ScopeHandle {
        let mut trails = self.trails.lock().unwrap_or_else(PoisonError::into_inner);
        trails.retain(|(weak, _)| weak.strong_count() > 0);
        let existing = trails
            .iter()
            .find(|(weak, _)| ptr::eq(weak.as_ptr(), Arc::as_ptr(hub)));
        if let Some((_, trail)) = existing {
            return trail.clone();
        }
        let trail = ScopeHandle::new();
        trails.push((Arc::downgrade(hub), trail.clone()));
        trail
    }
}

/// Captures an event through `client` using a snapshot of the hub's current
/// scope.
pub(crate) fn capture_with_hub_scope(hub: &Hub, client: &Client, event: Event<'static>) -> Uuid {
    let scope = hub.configure_scope(|scope| scope.clone());
    client.capture_event(event, Some(&scope))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breadcrumb(i: usize) -> Breadcrumb {
        Breadcrumb {
            message: Some(format!("crumb {}", i)),
            ..Default::default()
        }
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let scope = ScopeHandle::new();
        for i in 0..=MAX_BREADCRUMBS {
            scope.add_breadcrumb(breadcrumb(i), MAX_BREADCRUMBS);
        }
        let breadcrumbs = scope.breadcrumbs();
        assert_eq!(breadcrumbs.len(), MAX_BREADCRUMBS);
        assert_eq!(breadcrumbs[0].message.as_deref(), Some("crumb 1"));
        assert_eq!(
            breadcrumbs[MAX_BREADCRUMBS - 1].message.as_deref(),
            Some("crumb 1000")
        );
    }

    #[test]
    fn test_clones_share_state() {
        let scope = ScopeHandle::new();
        let other = scope.clone();
        other.add_breadcrumb(breadcrumb(0), MAX_BREADCRUMBS);
        assert!(scope.ptr_eq(&other));
        assert_eq!(scope.breadcrumbs().len(), 1);

        scope.clear_breadcrumbs();
        assert!(other.breadcrumbs().is_empty());
        assert!(!scope.ptr_eq(&ScopeHandle::new()));
    }

    #[test]
    fn test_concurrent_appends() {
        let scope = ScopeHandle::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let scope = scope.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        scope.add_breadcrumb(breadcrumb(i), MAX_BREADCRUMBS);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(scope.breadcrumbs().len(), 400);
    }

    #[test]
    fn test_hub_trails() {
        let hub = || Arc::new(Hub::new(None, Arc::new(Default::default())));
        let trails = HubTrails::default();
        let first = hub();
        let second = hub();

        assert!(trails.get(&first).ptr_eq(&trails.get(&first)));
        assert!(!trails.get(&first).ptr_eq(&trails.get(&second)));

        drop(second);
        trails.get(&first);
        assert_eq!(trails.trails.lock().unwrap().len(), 1);
    }
}
