//! Resource handles managed by the pool

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A pooled resource handle: the opaque resource plus an in-use flag.
///
/// Handles are created only while the pool is being filled and are owned by
/// the pool except while checked out. Cloning a `Handle` clones the
/// reference, not the resource; the in-use flag is shared between clones and
/// is mutated exclusively by the pool.
///
/// # Examples
///
/// ```
/// use corral::{FactoryError, Pool};
///
/// let pool = Pool::new(1, || Ok::<_, FactoryError>(42u32)).unwrap();
/// let handle = pool.acquire().unwrap();
/// assert_eq!(*handle, 42);
/// assert!(handle.is_in_use());
/// pool.release(handle).unwrap();
/// ```
pub struct Handle<T> {
    state: Arc<HandleState<T>>,
}

struct HandleState<T> {
    resource: T,
    in_use: AtomicBool,
}

impl<T> Handle<T> {
    pub(crate) fn new(resource: T) -> Self {
        Self {
            state: Arc::new(HandleState {
                resource,
                in_use: AtomicBool::new(false),
            }),
        }
    }

    /// Borrow the underlying resource.
    pub fn resource(&self) -> &T {
        &self.state.resource
    }

    /// Whether this handle is currently checked out of its pool.
    pub fn is_in_use(&self) -> bool {
        self.state.in_use.load(Ordering::Acquire)
    }

    pub(crate) fn mark_in_use(&self) {
        self.state.in_use.store(true, Ordering::Release);
    }

    /// Flip in-use back to free. Returns false if the handle was already
    /// free, which is how a double release is detected.
    pub(crate) fn clear_in_use(&self) -> bool {
        self.state
            .in_use
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.state.resource
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("resource", &self.state.resource)
            .field("in_use", &self.is_in_use())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_free() {
        let handle = Handle::new("resource");
        assert!(!handle.is_in_use());
        assert_eq!(*handle, "resource");
    }

    #[test]
    fn clear_is_exactly_once() {
        let handle = Handle::new(1u8);
        handle.mark_in_use();
        assert!(handle.clear_in_use());
        assert!(!handle.clear_in_use());
    }

    #[test]
    fn clones_share_the_flag() {
        let handle = Handle::new(());
        let alias = handle.clone();
        handle.mark_in_use();
        assert!(alias.is_in_use());
    }
}
