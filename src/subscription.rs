//! Scoped unregister handle shared by tree listeners and host event listeners.

use std::fmt;

/// Owns the teardown of one registration.
///
/// The teardown closure runs exactly once: on [`Subscription::cancel`] or when
/// the handle is dropped, whichever comes first.
#[must_use = "dropping a Subscription unregisters it immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A handle with nothing to tear down.
    pub fn noop() -> Self {
        Self { teardown: None }
    }

    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    pub fn cancel(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
