//! Glue between a navigation tree and the host UI runtime.
//!
//! * [`ElementHandler`] publishes a node's live element and its geometry as
//!   chain metadata.
//! * [`ActionMapper`] turns host input events into tree actions.
//! * [`FocusSync`] follows logical focus changes with real input focus.
//!
//! All three share a [`BindingConfig`] carrying the logger, metrics handle and
//! audit sink.

pub mod actions;
pub mod audit;
pub mod config;
pub mod element;
pub mod focus_state;
pub mod sync;

pub use actions::{
    ActionMapper, EventMapping, default_event_mapping, map_key_event, same_mapping,
};
pub use audit::{
    BindingAudit, BindingAuditEvent, BindingAuditEventBuilder, BindingAuditStage,
    MemoryBindingAudit, NullBindingAudit,
};
pub use config::BindingConfig;
pub use element::{ElementHandler, RefCallback};
pub use focus_state::{contains_focus, is_focused};
pub use sync::{FocusOutcome, FocusSync, SyncState, apply_logical_focus};
