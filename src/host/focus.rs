use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Who holds real input focus, and which focus transition put it there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEntry {
    pub element_id: String,
    pub sequence: u64,
}

/// The host's single real-focus slot.
#[derive(Debug, Default)]
pub struct FocusRegistry {
    inner: RefCell<Option<FocusEntry>>,
    transitions: Cell<u64>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focus(&self, element_id: impl Into<String>) {
        let sequence = self.transitions.get() + 1;
        self.transitions.set(sequence);
        *self.inner.borrow_mut() = Some(FocusEntry {
            element_id: element_id.into(),
            sequence,
        });
    }

    /// Drop focus, but only if `element_id` still holds it.
    pub fn blur(&self, element_id: &str) {
        let mut guard = self.inner.borrow_mut();
        if guard.as_ref().map(|e| e.element_id.as_str()) == Some(element_id) {
            *guard = None;
        }
    }

    pub fn current(&self) -> Option<FocusEntry> {
        self.inner.borrow().clone()
    }

    pub fn focused_element(&self) -> Option<String> {
        self.inner.borrow().as_ref().map(|e| e.element_id.clone())
    }

    /// Number of `set_focus` calls so far.
    pub fn transitions(&self) -> u64 {
        self.transitions.get()
    }
}

pub type SharedFocus = Rc<FocusRegistry>;
