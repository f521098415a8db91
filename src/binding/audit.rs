//! Lifecycle audit trail for binding components.
//!
//! Records capture a stage plus structured details so callers can verify or
//! visualize subscription lifecycles without instrumenting the components.

use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value;

/// Distinct checkpoints emitted by the binding components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAuditStage {
    /// A component installed its subscription.
    Attached,
    /// A component removed its subscription.
    Detached,
    /// A dependency identity changed and the subscription was replaced.
    Resubscribed,
    /// A host event was translated and handed to the dispatcher.
    ActionDispatched,
    /// A host event had no navigation meaning.
    EventUnmapped,
    /// Real focus was moved to the logically focused node's element.
    FocusApplied,
    /// Nothing to focus: no logical focus or no bound element.
    FocusSkipped,
    /// The host refused to focus the element.
    FocusRejected,
}

/// Structured audit entry.
#[derive(Debug, Clone)]
pub struct BindingAuditEvent {
    pub timestamp: SystemTime,
    pub component: &'static str,
    pub stage: BindingAuditStage,
    pub details: Vec<(String, Value)>,
}

/// Builder helper to append fields ergonomically.
pub struct BindingAuditEventBuilder {
    event: BindingAuditEvent,
}

impl BindingAuditEventBuilder {
    pub fn new(component: &'static str, stage: BindingAuditStage) -> Self {
        Self {
            event: BindingAuditEvent {
                timestamp: SystemTime::now(),
                component,
                stage,
                details: Vec::new(),
            },
        }
    }

    pub fn detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.event.details.push((key.into(), value));
        self
    }

    pub fn finish(self) -> BindingAuditEvent {
        self.event
    }
}

/// Trait implemented by any audit sink.
pub trait BindingAudit: Send + Sync {
    fn record(&self, event: BindingAuditEvent);
}

/// Default no-op implementation used when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullBindingAudit;

impl BindingAudit for NullBindingAudit {
    fn record(&self, _event: BindingAuditEvent) {}
}

/// Keeps the trail in memory.
#[derive(Debug, Default)]
pub struct MemoryBindingAudit {
    events: Mutex<Vec<BindingAuditEvent>>,
}

impl MemoryBindingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BindingAuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<BindingAuditStage> {
        self.events().into_iter().map(|event| event.stage).collect()
    }

    pub fn count(&self, stage: BindingAuditStage) -> usize {
        self.events()
            .iter()
            .filter(|event| event.stage == stage)
            .count()
    }
}

impl BindingAudit for MemoryBindingAudit {
    fn record(&self, event: BindingAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
