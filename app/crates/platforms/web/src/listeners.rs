//! State-change listeners

use std::cell::RefCell;
use std::rc::Rc;

/// Shared list of listeners
///
/// Notification walks a snapshot of the list, so a listener may register
/// further listeners while it runs. Those are first called on the next
/// notification.
#[derive(Debug)]
pub struct Listeners<L> {
    inner: Rc<RefCell<Vec<L>>>,
}

impl<L> Clone for Listeners<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<L> Default for Listeners<L> {
    fn default() -> Self {
        Self {
            inner: Rc::default(),
        }
    }
}

impl<L: Clone> Listeners<L> {
    /// Register a listener
    pub fn add(&self, listener: L) {
        self.inner.borrow_mut().push(listener);
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Call `notify` once for every listener registered when this starts
    pub fn notify(&self, mut notify: impl FnMut(&L)) {
        let snapshot = self.inner.borrow().clone();
        for listener in &snapshot {
            notify(listener);
        }
    }
}
