use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::audit::{BindingAudit, BindingAuditEventBuilder, BindingAuditStage};
use crate::host::HostEventKind;
use crate::logging::{LogLevel, Logger};
use crate::metrics::BindingMetrics;

/// Configuration knobs shared by the binding components.
#[derive(Clone)]
pub struct BindingConfig {
    /// Host event family the action mapper listens to.
    pub event_kind: HostEventKind,
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Counters shared across every component holding this config.
    pub metrics: Option<Arc<Mutex<BindingMetrics>>>,
    /// Optional lifecycle audit sink.
    pub audit: Option<Arc<dyn BindingAudit>>,
    /// Prefix for log targets; components append `.actions` or `.sync`.
    pub log_target: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            event_kind: HostEventKind::Key,
            logger: None,
            metrics: None,
            audit: None,
            log_target: "room_nav::binding".to_string(),
        }
    }
}

impl BindingConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn BindingAudit>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_event_kind(mut self, kind: HostEventKind) -> Self {
        self.event_kind = kind;
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(BindingMetrics::new())));
        }
    }

    /// Disable metrics collection.
    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<BindingMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    /// Emit the current metrics snapshot through the logger.
    pub fn log_metrics_snapshot(&self) {
        if let (Some(logger), Some(metrics)) = (self.logger.as_ref(), self.metrics.as_ref()) {
            if let Ok(guard) = metrics.lock() {
                let target = format!("{}.metrics", self.log_target);
                let _ = logger.log_event(guard.snapshot().to_log_event(&target));
            }
        }
    }

    pub(crate) fn log<I>(&self, component: &str, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            if !logger.enabled(level) {
                return;
            }
            let target = format!("{}.{component}", self.log_target);
            let _ = logger.log_with_fields(level, &target, message, fields.into_iter().collect());
        }
    }

    pub(crate) fn record_metric(&self, update: impl FnOnce(&mut BindingMetrics)) {
        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut *guard);
            }
        }
    }

    pub(crate) fn audit<I>(&self, component: &'static str, stage: BindingAuditStage, details: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(audit) = self.audit.as_ref() {
            let event = details
                .into_iter()
                .fold(
                    BindingAuditEventBuilder::new(component, stage),
                    |builder, (key, value)| builder.detail(key, value),
                )
                .finish();
            audit.record(event);
        }
    }
}
