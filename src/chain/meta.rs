use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::core::{ChainAction, Middleware, Next, NodeContext, Resolution};
use crate::geometry::Rect;
use crate::host::ElementRef;
use crate::tree::NavigationTree;

/// Live host element bound to a node.
pub static NODE_ELEMENT: MetadataKey<ElementRef> = MetadataKey::new("node.element");

/// Screen rectangle of the node's live element, measured at query time.
pub static NODE_POSITION: MetadataKey<Rect> = MetadataKey::new("node.position");

/// Runtime identity of a metadata key: its name plus the value type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetaKeyId {
    name: &'static str,
    type_id: TypeId,
}

impl MetaKeyId {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for MetaKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetaKeyId({})", self.name)
    }
}

/// Typed capability slot that handler chains can answer for.
pub struct MetadataKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> MetadataKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> MetaKeyId {
        MetaKeyId {
            name: self.name,
            type_id: TypeId::of::<T>(),
        }
    }

    /// Ask `node`'s handler chain for this key. Absent when the node is unknown,
    /// when no layer answers, or when the answering accessor has nothing.
    pub fn query(&self, tree: &dyn NavigationTree, node: &str) -> Option<T> {
        let chain = tree.handler(node)?;
        chain.query(self, &NodeContext::new(tree, node))
    }
}

impl<T> fmt::Debug for MetadataKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MetadataKey").field(&self.name).finish()
    }
}

/// Layer answering queries for a single key and delegating everything else.
pub(crate) struct MetaLayer<T> {
    key: MetaKeyId,
    accessor: Rc<dyn Fn() -> Option<T>>,
}

impl<T: 'static> MetaLayer<T> {
    pub(crate) fn new<F>(key: MetaKeyId, accessor: F) -> Self
    where
        F: Fn() -> Option<T> + 'static,
    {
        Self {
            key,
            accessor: Rc::new(accessor),
        }
    }
}

impl<T: 'static> Middleware for MetaLayer<T> {
    fn resolve(
        &self,
        _node: &NodeContext<'_>,
        action: &ChainAction,
        next: Next<'_>,
    ) -> Option<Resolution> {
        match action {
            ChainAction::Query(key) if *key == self.key => {
                Some(Resolution::Meta(Box::new((self.accessor)())))
            }
            _ => next.run(),
        }
    }
}
