//! Navigation tree contract.
//!
//! The binding layer never owns the tree. It reaches it through the
//! [`NavigationTree`] trait object carried in a [`TreeHandle`], reads focus and
//! metadata, triggers actions and subscribes to focus changes. [`NodeTree`] is
//! a small in-memory implementation of the contract.

mod listeners;
mod memory;

use std::fmt;
use std::rc::Rc;

use crate::Result;
use crate::chain::{HandlerChain, NavigationAction, NodeId};
use crate::subscription::Subscription;

pub use listeners::ListenerRegistry;
pub use memory::{NodeTree, ROOT_ID};

/// Shared capability handle over an externally owned tree.
pub type TreeHandle = Rc<dyn NavigationTree>;

/// Surface of the navigation tree consumed by the binding layer.
pub trait NavigationTree {
    /// Node currently holding logical focus.
    fn focused_id(&self) -> Option<NodeId>;

    /// Parent of `node`; `None` for the root and for unknown nodes.
    fn parent_of(&self, node: &str) -> Option<NodeId>;

    /// Handler chain registered for `node`.
    fn handler(&self, node: &str) -> Option<HandlerChain>;

    /// Resolve `action` against the focused node and move logical focus.
    /// Returns the newly focused node when focus moved.
    fn dispatch(&self, action: NavigationAction) -> Result<Option<NodeId>>;

    /// Register a listener; dropping or cancelling the returned handle
    /// unregisters it.
    fn register_listener(&self, listener: TreeListener) -> Subscription;
}

/// Same tree behind both handles.
pub fn same_tree(a: &TreeHandle, b: &TreeHandle) -> bool {
    Rc::ptr_eq(a, b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeEventKind {
    FocusChange,
}

impl TreeEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FocusChange => "focuschange",
        }
    }
}

/// Which nodes a listener cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFilter {
    /// Every node in the tree; the root-scoped filter.
    Any,
    /// Changes whose previous or current focus lies in this subtree.
    Subtree(NodeId),
}

/// Payload of a focus-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusChange {
    pub previous: Option<NodeId>,
    pub current: Option<NodeId>,
}

pub type ListenerFn = Rc<dyn Fn(&FocusChange)>;

pub struct TreeListener {
    pub kind: TreeEventKind,
    pub filter: NodeFilter,
    pub callback: ListenerFn,
}

impl TreeListener {
    /// Focus-change listener scoped to the whole tree.
    pub fn focus_change(callback: impl Fn(&FocusChange) + 'static) -> Self {
        Self {
            kind: TreeEventKind::FocusChange,
            filter: NodeFilter::Any,
            callback: Rc::new(callback),
        }
    }

    pub fn with_filter(mut self, filter: NodeFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl fmt::Debug for TreeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeListener")
            .field("kind", &self.kind)
            .field("filter", &self.filter)
            .finish()
    }
}
