//! View handles and the store that keeps them alive.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Shared handle to one mounted view.
///
/// Cloning is cheap; all clones point at the same state. Access goes through
/// [`View::read`] and [`View::update`] so a lock guard can never live across
/// an `.await`.
pub struct View<T> {
    inner: Arc<ViewInner<T>>,
}

struct ViewInner<T> {
    id: String,
    state: RwLock<T>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

impl<T> View<T> {
    fn new(id: String, state: T) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                id,
                state: RwLock::new(state),
                last_activity: RwLock::new(Utc::now()),
            }),
        }
    }

    /// Get the view ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Run `f` against a shared borrow of the state.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` against an exclusive borrow of the state and mark the view active.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut guard = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        };
        self.touch();
        result
    }

    /// Update the last activity timestamp.
    pub fn touch(&self) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Utc::now();
    }

    /// Check if the view has been idle longer than `timeout`.
    #[must_use]
    pub fn is_idle_for(&self, timeout: Duration) -> bool {
        let last = *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        // Negative duration means clock skew; treat the view as active.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}

/// Thread-safe store for mounted views of one kind.
pub struct ViewStore<T> {
    inner: Arc<RwLock<HashMap<String, View<T>>>>,
}

impl<T> Clone for ViewStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ViewStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewStore")
            .field("views", &self.len())
            .finish()
    }
}

impl<T> Default for ViewStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewStore<T> {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Mount a view with the given initial state under a fresh id.
    pub fn mount_with(&self, state: T) -> View<T> {
        let view = View::new(Uuid::new_v4().to_string(), state);
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(view.id().to_string(), view.clone());
        view
    }

    /// Get a view by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<View<T>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Remove a view by ID.
    pub fn remove(&self, id: &str) -> Option<View<T>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Get the number of mounted views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if there are no mounted views.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove views that have been idle longer than the timeout.
    ///
    /// Returns the number of views removed.
    pub fn sweep_idle(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, view| !view.is_idle_for(timeout));
        before - guard.len()
    }
}

impl<T: Default> ViewStore<T> {
    /// Mount a view with default (empty) state under a fresh id.
    pub fn mount(&self) -> View<T> {
        self.mount_with(T::default())
    }
}
