use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{FocusChange, ListenerFn, NodeFilter, TreeEventKind, TreeListener};
use crate::subscription::Subscription;

struct ListenerEntry {
    id: u64,
    kind: TreeEventKind,
    filter: NodeFilter,
    callback: ListenerFn,
    alive: Rc<Cell<bool>>,
}

/// Listener bookkeeping for tree implementations.
///
/// Delivery iterates over a snapshot, so callbacks may register or cancel
/// listeners; a listener cancelled mid-delivery is skipped.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: Rc<RefCell<Vec<ListenerEntry>>>,
    next_id: Cell<u64>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: TreeListener) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let alive = Rc::new(Cell::new(true));

        self.entries.borrow_mut().push(ListenerEntry {
            id,
            kind: listener.kind,
            filter: listener.filter,
            callback: listener.callback,
            alive: alive.clone(),
        });

        let entries = Rc::downgrade(&self.entries);
        Subscription::new(move || {
            alive.set(false);
            if let Some(entries) = entries.upgrade() {
                // Released after the borrow ends: the callback may own other
                // subscriptions on this registry.
                let removed = {
                    let mut guard = entries.borrow_mut();
                    guard
                        .iter()
                        .position(|entry| entry.id == id)
                        .map(|index| guard.remove(index))
                };
                drop(removed);
            }
        })
    }

    /// Deliver `change` to every live focus-change listener whose filter
    /// passes `matches`.
    pub fn notify(&self, change: &FocusChange, matches: impl Fn(&NodeFilter) -> bool) {
        let snapshot: Vec<(Rc<Cell<bool>>, ListenerFn)> = self
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == TreeEventKind::FocusChange && matches(&entry.filter))
            .map(|entry| (entry.alive.clone(), entry.callback.clone()))
            .collect();

        for (alive, callback) in snapshot {
            if alive.get() {
                callback(change);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change() -> FocusChange {
        FocusChange {
            previous: None,
            current: Some("#/a".into()),
        }
    }

    #[test]
    fn cancelled_listener_is_not_notified() {
        let registry = ListenerRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let sub = registry.register(TreeListener::focus_change(move |_| {
            counter.set(counter.get() + 1)
        }));
        registry.notify(&change(), |_| true);
        sub.cancel();
        registry.notify(&change(), |_| true);
        assert_eq!(hits.get(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn listener_cancelled_during_delivery_is_skipped() {
        let registry = ListenerRegistry::new();
        let victim_hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let killer_slot = slot.clone();
        let _killer = registry.register(TreeListener::focus_change(move |_| {
            if let Some(sub) = killer_slot.borrow_mut().take() {
                sub.cancel();
            }
        }));
        let counter = victim_hits.clone();
        *slot.borrow_mut() = Some(registry.register(TreeListener::focus_change(move |_| {
            counter.set(counter.get() + 1)
        })));

        registry.notify(&change(), |_| true);
        assert_eq!(victim_hits.get(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn filter_predicate_is_honoured() {
        let registry = ListenerRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let _sub = registry.register(
            TreeListener::focus_change(move |_| counter.set(counter.get() + 1))
                .with_filter(NodeFilter::Subtree("#/b".into())),
        );
        registry.notify(&change(), |filter| matches!(filter, NodeFilter::Any));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn cancelling_listener_that_owns_a_subscription() {
        let registry = ListenerRegistry::new();
        let inner = registry.register(TreeListener::focus_change(|_| {}));
        let outer = registry.register(TreeListener::focus_change(move |_| {
            let _ = inner.is_active();
        }));
        assert_eq!(registry.len(), 2);

        outer.cancel();
        assert!(registry.is_empty());
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let registry = ListenerRegistry::new();
        let sub = registry.register(TreeListener::focus_change(|_| {}));
        drop(registry);
        sub.cancel();
    }
}
