//! Binding layer between a keyboard navigation tree and a terminal UI runtime.
//!
//! The tree decides which node is logically focused and how actions move that
//! focus. This crate wires it to the host: nodes expose their live element and
//! geometry through composable handler chains, host input is translated into
//! tree actions, and every logical focus change is mirrored onto real input
//! focus.

pub mod binding;
pub mod chain;
pub mod error;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod metrics;
pub mod subscription;
pub mod tree;

#[cfg(test)]
mod testing;

pub use binding::{
    ActionMapper, BindingAudit, BindingAuditStage, BindingConfig, ElementHandler, EventMapping,
    FocusOutcome, FocusSync, MemoryBindingAudit, NullBindingAudit, SyncState,
    apply_logical_focus, contains_focus, default_event_mapping, is_focused, map_key_event,
};
pub use chain::{
    ChainAction, HandlerChain, MetadataKey, Middleware, NODE_ELEMENT, NODE_POSITION,
    NavigationAction, Next, NodeContext, NodeId, Resolution,
};
pub use error::{NavError, Result};
pub use geometry::Rect;
pub use host::{
    ElementRef, EventFlow, EventHub, EventTarget, FocusRegistry, HostElement, HostEventKind,
    HostHandler, ListenerId, TargetHandle, ZoneElement,
};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult, MemorySink};
pub use metrics::{BindingMetrics, MetricSnapshot};
pub use subscription::Subscription;
pub use tree::{FocusChange, NavigationTree, NodeFilter, NodeTree, ROOT_ID, TreeHandle, TreeListener};
