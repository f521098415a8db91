use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters accumulated by the binding components sharing one handle.
#[derive(Debug, Default, Clone)]
pub struct BindingMetrics {
    subscriptions_installed: u64,
    subscriptions_removed: u64,
    actions_dispatched: u64,
    events_unmapped: u64,
    focus_applied: u64,
    focus_skipped: u64,
    focus_rejected: u64,
}

impl BindingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_subscribe(&mut self) {
        self.subscriptions_installed = self.subscriptions_installed.saturating_add(1);
    }

    pub fn record_unsubscribe(&mut self) {
        self.subscriptions_removed = self.subscriptions_removed.saturating_add(1);
    }

    pub fn record_dispatch(&mut self) {
        self.actions_dispatched = self.actions_dispatched.saturating_add(1);
    }

    pub fn record_unmapped(&mut self) {
        self.events_unmapped = self.events_unmapped.saturating_add(1);
    }

    pub fn record_focus_applied(&mut self) {
        self.focus_applied = self.focus_applied.saturating_add(1);
    }

    pub fn record_focus_skipped(&mut self) {
        self.focus_skipped = self.focus_skipped.saturating_add(1);
    }

    pub fn record_focus_rejected(&mut self) {
        self.focus_rejected = self.focus_rejected.saturating_add(1);
    }

    /// Subscriptions installed and not yet removed.
    pub fn live_subscriptions(&self) -> u64 {
        self.subscriptions_installed
            .saturating_sub(self.subscriptions_removed)
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            subscriptions_installed: self.subscriptions_installed,
            subscriptions_removed: self.subscriptions_removed,
            actions_dispatched: self.actions_dispatched,
            events_unmapped: self.events_unmapped,
            focus_applied: self.focus_applied,
            focus_skipped: self.focus_skipped,
            focus_rejected: self.focus_rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub subscriptions_installed: u64,
    pub subscriptions_removed: u64,
    pub actions_dispatched: u64,
    pub events_unmapped: u64,
    pub focus_applied: u64,
    pub focus_skipped: u64,
    pub focus_rejected: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "binding_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert(
            "subscriptions_installed".to_string(),
            json!(self.subscriptions_installed),
        );
        map.insert(
            "subscriptions_removed".to_string(),
            json!(self.subscriptions_removed),
        );
        map.insert(
            "actions_dispatched".to_string(),
            json!(self.actions_dispatched),
        );
        map.insert("events_unmapped".to_string(), json!(self.events_unmapped));
        map.insert("focus_applied".to_string(), json!(self.focus_applied));
        map.insert("focus_skipped".to_string(), json!(self.focus_skipped));
        map.insert("focus_rejected".to_string(), json!(self.focus_rejected));
        map
    }
}
