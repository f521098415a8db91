//! Handler chains: ordered middleware pipelines that resolve navigation
//! actions and metadata queries for a node.
//!
//! The traversal strategies that plug into a chain live with the navigation
//! tree; this module only provides the composition primitives and the
//! well-known metadata keys the binding layer answers for.

mod core;
mod meta;

pub use self::core::{
    ChainAction, HandlerChain, Middleware, NavigationAction, Next, NodeContext, NodeId,
    Resolution,
};
pub use meta::{MetaKeyId, MetadataKey, NODE_ELEMENT, NODE_POSITION};
