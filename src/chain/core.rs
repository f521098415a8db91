use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::meta::{MetaKeyId, MetaLayer, MetadataKey};
use crate::tree::NavigationTree;

/// Node identifier as handed out by the navigation tree.
pub type NodeId = String;

/// Abstract navigation intent produced from host input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationAction {
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    Next,
    Prev,
}

impl NavigationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Select => "select",
            Self::Back => "back",
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

/// What travels down a handler chain: a navigation request or a metadata query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainAction {
    Navigate(NavigationAction),
    Query(MetaKeyId),
}

/// A short-circuit answer from some layer of the chain.
pub enum Resolution {
    /// Move logical focus to this node.
    Focus(NodeId),
    /// Answer to a metadata query, boxed `Option<T>` for the queried key's `T`.
    Meta(Box<dyn Any>),
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Focus(id) => f.debug_tuple("Focus").field(id).finish(),
            Self::Meta(_) => f.write_str("Meta(..)"),
        }
    }
}

/// The node a chain is being resolved for.
#[derive(Clone, Copy)]
pub struct NodeContext<'a> {
    pub tree: &'a dyn NavigationTree,
    pub id: &'a str,
}

impl<'a> NodeContext<'a> {
    pub fn new(tree: &'a dyn NavigationTree, id: &'a str) -> Self {
        Self { tree, id }
    }

    pub fn is_focused(&self) -> bool {
        self.tree.focused_id().as_deref() == Some(self.id)
    }
}

/// One layer of a handler chain.
pub trait Middleware {
    fn resolve(
        &self,
        node: &NodeContext<'_>,
        action: &ChainAction,
        next: Next<'_>,
    ) -> Option<Resolution>;
}

impl<F> Middleware for F
where
    F: Fn(&NodeContext<'_>, &ChainAction, Next<'_>) -> Option<Resolution>,
{
    fn resolve(
        &self,
        node: &NodeContext<'_>,
        action: &ChainAction,
        next: Next<'_>,
    ) -> Option<Resolution> {
        self(node, action, next)
    }
}

/// Continuation over the layers that have not run yet.
pub struct Next<'a> {
    layers: &'a [Rc<dyn Middleware>],
    node: &'a NodeContext<'a>,
    action: &'a ChainAction,
}

impl<'a> Next<'a> {
    /// Delegate to the remaining layers; an exhausted chain yields `None`.
    pub fn run(self) -> Option<Resolution> {
        let (head, rest) = self.layers.split_first()?;
        head.resolve(
            self.node,
            self.action,
            Next {
                layers: rest,
                node: self.node,
                action: self.action,
            },
        )
    }

    /// Number of layers still pending behind this continuation.
    pub fn remaining(&self) -> usize {
        self.layers.len()
    }
}

/// Immutable ordered list of middleware layers. The first layer runs first.
#[derive(Clone)]
pub struct HandlerChain {
    layers: Rc<Vec<Rc<dyn Middleware>>>,
}

impl Default for HandlerChain {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerChain {
    pub fn new() -> Self {
        Self {
            layers: Rc::new(Vec::new()),
        }
    }

    /// Returns a new chain where `layer` runs before every existing layer.
    pub fn prepend<F>(&self, layer: F) -> Self
    where
        F: Fn(&NodeContext<'_>, &ChainAction, Next<'_>) -> Option<Resolution> + 'static,
    {
        self.prepend_layer(layer)
    }

    /// Same as [`HandlerChain::prepend`] for named [`Middleware`] types.
    pub fn prepend_layer<M>(&self, layer: M) -> Self
    where
        M: Middleware + 'static,
    {
        let mut layers: Vec<Rc<dyn Middleware>> = Vec::with_capacity(self.layers.len() + 1);
        layers.push(Rc::new(layer));
        layers.extend(self.layers.iter().cloned());
        Self {
            layers: Rc::new(layers),
        }
    }

    /// Attach a metadata accessor for `key`. It shadows any earlier accessor for
    /// the same key and is evaluated on every query.
    pub fn meta<T, F>(&self, key: &MetadataKey<T>, accessor: F) -> Self
    where
        T: 'static,
        F: Fn() -> Option<T> + 'static,
    {
        self.prepend_layer(MetaLayer::new(key.id(), accessor))
    }

    pub fn resolve(&self, node: &NodeContext<'_>, action: &ChainAction) -> Option<Resolution> {
        Next {
            layers: self.layers.as_slice(),
            node,
            action,
        }
        .run()
    }

    /// Run the chain for a navigation action, keeping only focus answers.
    pub fn navigate(&self, node: &NodeContext<'_>, action: NavigationAction) -> Option<NodeId> {
        match self.resolve(node, &ChainAction::Navigate(action)) {
            Some(Resolution::Focus(target)) => Some(target),
            _ => None,
        }
    }

    /// Run the chain for a metadata query on `key`.
    pub fn query<T: 'static>(&self, key: &MetadataKey<T>, node: &NodeContext<'_>) -> Option<T> {
        match self.resolve(node, &ChainAction::Query(key.id()))? {
            Resolution::Meta(answer) => answer.downcast::<Option<T>>().ok().and_then(|v| *v),
            Resolution::Focus(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("layers", &self.layers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeTree, ROOT_ID};
    use std::cell::{Cell, RefCell};

    fn focus_to(target: &'static str) -> impl Fn(&NodeContext<'_>, &ChainAction, Next<'_>) -> Option<Resolution> {
        move |_node, _action, _next| Some(Resolution::Focus(target.to_string()))
    }

    #[test]
    fn empty_chain_yields_none() {
        let tree = NodeTree::new();
        let ctx = NodeContext::new(&tree, ROOT_ID);
        let chain = HandlerChain::new();
        assert!(chain.is_empty());
        assert!(chain.navigate(&ctx, NavigationAction::Down).is_none());
    }

    #[test]
    fn last_prepended_runs_first() {
        let tree = NodeTree::new();
        let ctx = NodeContext::new(&tree, ROOT_ID);
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = order.clone();
        let second = order.clone();
        let chain = HandlerChain::new()
            .prepend(move |_n, _a, next| {
                first.borrow_mut().push("first");
                next.run()
            })
            .prepend(move |_n, _a, next| {
                second.borrow_mut().push("second");
                next.run()
            });

        assert_eq!(chain.len(), 2);
        assert!(chain.navigate(&ctx, NavigationAction::Select).is_none());
        assert_eq!(*order.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn continuation_reports_pending_layers() {
        let tree = NodeTree::new();
        let ctx = NodeContext::new(&tree, ROOT_ID);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let outer = seen.clone();
        let inner = seen.clone();
        let chain = HandlerChain::new()
            .prepend(move |_n, _a, next| {
                inner.borrow_mut().push(next.remaining());
                next.run()
            })
            .prepend(move |_n, _a, next| {
                outer.borrow_mut().push(next.remaining());
                next.run()
            });

        assert!(chain.navigate(&ctx, NavigationAction::Next).is_none());
        assert_eq!(*seen.borrow(), vec![1, 0]);
    }

    #[test]
    fn prepend_leaves_other_holders_untouched() {
        let tree = NodeTree::new();
        let ctx = NodeContext::new(&tree, ROOT_ID);
        let base = HandlerChain::new().prepend(focus_to("#/a"));
        let extended = base.prepend(focus_to("#/b"));

        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(base.navigate(&ctx, NavigationAction::Up).as_deref(), Some("#/a"));
        assert_eq!(
            extended.navigate(&ctx, NavigationAction::Up).as_deref(),
            Some("#/b")
        );
    }

    #[test]
    fn false_condition_short_circuits_the_rest() {
        let tree = NodeTree::new();
        let ctx = NodeContext::new(&tree, ROOT_ID);
        let accessor_calls = Rc::new(Cell::new(0));
        let later_calls = Rc::new(Cell::new(0));
        let cond = false;

        let accessor_counter = accessor_calls.clone();
        let later_counter = later_calls.clone();
        let key: MetadataKey<u32> = MetadataKey::new("test.counter");
        let chain = HandlerChain::new()
            .prepend(move |_n, _a, next| {
                later_counter.set(later_counter.get() + 1);
                next.run()
            })
            .meta(&key, move || {
                accessor_counter.set(accessor_counter.get() + 1);
                Some(7)
            })
            .prepend(move |_n, _a, next| if cond { next.run() } else { None });

        assert!(chain.navigate(&ctx, NavigationAction::Down).is_none());
        assert_eq!(chain.query(&key, &ctx), None);
        assert_eq!(accessor_calls.get(), 0);
        assert_eq!(later_calls.get(), 0);
    }

    #[test]
    fn navigation_skips_meta_layers() {
        let tree = NodeTree::new();
        let ctx = NodeContext::new(&tree, ROOT_ID);
        let key: MetadataKey<&'static str> = MetadataKey::new("test.label");
        let chain = HandlerChain::new()
            .prepend(focus_to("#/target"))
            .meta(&key, || Some("label"));

        assert_eq!(
            chain.navigate(&ctx, NavigationAction::Right).as_deref(),
            Some("#/target")
        );
        assert_eq!(chain.query(&key, &ctx), Some("label"));
    }

    #[test]
    fn node_context_reports_focus() {
        let tree = NodeTree::new();
        let id = tree.insert(ROOT_ID, "item", HandlerChain::new()).unwrap();
        tree.focus(&id).unwrap();
        assert!(NodeContext::new(&tree, &id).is_focused());
        assert!(!NodeContext::new(&tree, ROOT_ID).is_focused());
    }
}
