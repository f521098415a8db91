//! Test doubles shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::chain::{HandlerChain, NavigationAction, NodeId};
use crate::host::{EventFlow, EventHub, EventTarget, HostEventKind, HostHandler, ListenerId};
use crate::subscription::Subscription;
use crate::tree::{FocusChange, ListenerRegistry, NavigationTree, TreeListener};
use crate::{NavError, Result};

pub(crate) fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub(crate) fn key_release(code: KeyCode) -> Event {
    let mut event = KeyEvent::new(code, KeyModifiers::NONE);
    event.kind = KeyEventKind::Release;
    Event::Key(event)
}

/// Tree that records dispatched actions and can hold notifications back
/// until [`RecordingTree::flush`].
#[derive(Default)]
pub(crate) struct RecordingTree {
    focused: RefCell<Option<NodeId>>,
    chains: RefCell<HashMap<NodeId, HandlerChain>>,
    actions: RefCell<Vec<NavigationAction>>,
    listeners: ListenerRegistry,
    deferred: Cell<bool>,
    pending: RefCell<Vec<FocusChange>>,
    failing: Cell<bool>,
}

impl RecordingTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_node(&self, id: &str, chain: HandlerChain) {
        self.chains.borrow_mut().insert(id.to_string(), chain);
    }

    pub(crate) fn set_focus(&self, id: Option<&str>) {
        let current = id.map(str::to_string);
        let previous = self.focused.replace(current.clone());
        let change = FocusChange { previous, current };
        if self.deferred.get() {
            self.pending.borrow_mut().push(change);
        } else {
            self.listeners.notify(&change, |_| true);
        }
    }

    pub(crate) fn defer_notifications(&self, deferred: bool) {
        self.deferred.set(deferred);
    }

    pub(crate) fn flush(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for change in pending {
            self.listeners.notify(&change, |_| true);
        }
    }

    pub(crate) fn fail_dispatch(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub(crate) fn actions(&self) -> Vec<NavigationAction> {
        self.actions.borrow().clone()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl NavigationTree for RecordingTree {
    fn focused_id(&self) -> Option<NodeId> {
        self.focused.borrow().clone()
    }

    fn parent_of(&self, node: &str) -> Option<NodeId> {
        node.rsplit_once('/').map(|(parent, _)| parent.to_string())
    }

    fn handler(&self, node: &str) -> Option<HandlerChain> {
        self.chains.borrow().get(node).cloned()
    }

    fn dispatch(&self, action: NavigationAction) -> Result<Option<NodeId>> {
        self.actions.borrow_mut().push(action);
        if self.failing.get() {
            return Err(NavError::Host("dispatch refused".into()));
        }
        Ok(None)
    }

    fn register_listener(&self, listener: TreeListener) -> Subscription {
        self.listeners.register(listener)
    }
}

/// Event target counting listener installs and removals.
#[derive(Default)]
pub(crate) struct CountingTarget {
    hub: EventHub,
    added: Cell<usize>,
    removed: Cell<usize>,
}

impl CountingTarget {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn emit(&self, event: &Event) -> Result<EventFlow> {
        self.hub.emit(event)
    }

    pub(crate) fn added(&self) -> usize {
        self.added.get()
    }

    pub(crate) fn removed(&self) -> usize {
        self.removed.get()
    }

    pub(crate) fn live(&self) -> usize {
        self.hub.listener_count(HostEventKind::Key)
    }
}

impl EventTarget for CountingTarget {
    fn add_listener(&self, kind: HostEventKind, handler: HostHandler) -> ListenerId {
        self.added.set(self.added.get() + 1);
        self.hub.add_listener(kind, handler)
    }

    fn remove_listener(&self, kind: HostEventKind, id: ListenerId) -> bool {
        self.removed.set(self.removed.get() + 1);
        self.hub.remove_listener(kind, id)
    }
}
