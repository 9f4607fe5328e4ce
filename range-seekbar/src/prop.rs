//! Callback handles for explicit registration.
//!
//! Handles wrap an `Arc` and compare by identity, so a struct holding them
//! can still derive `PartialEq`. Cloning shares the closure.

use std::{fmt, sync::Arc};

type Shared<T, R> = Arc<dyn Fn(T) -> R + Send + Sync>;

/// A shared `Fn()` handle, e.g. a repaint request.
#[derive(Clone)]
pub struct Callback(Shared<(), ()>);

impl Callback {
    /// Wraps `handler`.
    pub fn new(handler: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |()| handler()))
    }

    /// Runs the handler.
    pub fn call(&self) {
        (self.0)(());
    }
}

impl<F: Fn() + Send + Sync + 'static> From<F> for Callback {
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl Default for Callback {
    fn default() -> Self {
        Self::new(|| {})
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0))
    }
}

/// A shared `Fn(T) -> R` handle, e.g. a range change observer.
pub struct CallbackWith<T, R = ()>(Shared<T, R>);

impl<T, R> CallbackWith<T, R> {
    /// Wraps `handler`.
    pub fn new(handler: impl Fn(T) -> R + Send + Sync + 'static) -> Self {
        Self(Arc::new(handler))
    }

    /// Runs the handler with `value`.
    pub fn call(&self, value: T) -> R {
        (self.0)(value)
    }
}

impl<T, R, F: Fn(T) -> R + Send + Sync + 'static> From<F> for CallbackWith<T, R> {
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl<T, R> Clone for CallbackWith<T, R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for CallbackWith<T> {
    fn default() -> Self {
        Self::new(|_| {})
    }
}

impl<T, R> PartialEq for CallbackWith<T, R> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T, R> Eq for CallbackWith<T, R> {}

impl<T, R> fmt::Debug for CallbackWith<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackWith({:p})", Arc::as_ptr(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI32, Ordering};

    use super::*;

    #[test]
    fn clones_are_equal_and_fresh_handles_are_not() {
        let repaint = Callback::new(|| {});
        assert_eq!(repaint, repaint.clone());
        assert_ne!(repaint, Callback::default());
    }

    #[test]
    fn value_reaches_the_handler() {
        let seen = Arc::new(AtomicI32::new(0));
        let sink = Arc::clone(&seen);
        let observer: CallbackWith<i32> = (move |value: i32| sink.store(value, Ordering::SeqCst)).into();
        observer.clone().call(42);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }
}
