use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;

use super::audit::BindingAuditStage;
use super::config::BindingConfig;
use crate::chain::{NODE_ELEMENT, NodeId};
use crate::logging::{LogLevel, json_kv};
use crate::metrics::BindingMetrics;
use crate::subscription::Subscription;
use crate::tree::{FocusChange, NavigationTree, TreeHandle, TreeListener, same_tree};
use crate::{NavError, Result};

const COMPONENT: &str = "sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unsubscribed,
    Subscribed,
}

/// What one logical-to-real focus step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    /// The node's element received real focus.
    Applied(NodeId),
    /// No node holds logical focus.
    NoLogicalFocus,
    /// The focused node has no element bound.
    Unbound(NodeId),
    /// The host refused to focus the element.
    Rejected { node: NodeId, reason: String },
}

/// Give real focus to the element bound to the tree's logically focused node.
pub fn apply_logical_focus(tree: &dyn NavigationTree) -> FocusOutcome {
    let Some(node) = tree.focused_id() else {
        return FocusOutcome::NoLogicalFocus;
    };
    let Some(element) = NODE_ELEMENT.query(tree, &node) else {
        return FocusOutcome::Unbound(node);
    };
    match element.focus() {
        Ok(()) => FocusOutcome::Applied(node),
        Err(err) => FocusOutcome::Rejected {
            node,
            reason: err.to_string(),
        },
    }
}

struct ActiveSync {
    tree: TreeHandle,
    subscription: Subscription,
}

/// Keeps real input focus on the element of the logically focused node.
///
/// Listens to every focus change of one tree and applies it in the same turn.
/// Nothing is retried: a refused focus stays refused until the next change.
pub struct FocusSync {
    config: BindingConfig,
    active: Option<ActiveSync>,
}

impl FocusSync {
    pub fn new(config: BindingConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn attach(&mut self, tree: TreeHandle) -> Result<()> {
        if self.active.is_some() {
            return Err(NavError::AlreadyAttached("focus sync"));
        }
        self.active = Some(self.subscribe(tree));
        self.config
            .audit(COMPONENT, BindingAuditStage::Attached, std::iter::empty());
        Ok(())
    }

    /// Move the subscription to `tree`. Returns `false` when already listening
    /// to that same tree.
    pub fn update(&mut self, tree: TreeHandle) -> bool {
        if let Some(active) = self.active.as_ref() {
            if same_tree(&active.tree, &tree) {
                return false;
            }
        }

        let replaced = self.teardown();
        self.active = Some(self.subscribe(tree));
        let stage = if replaced {
            BindingAuditStage::Resubscribed
        } else {
            BindingAuditStage::Attached
        };
        self.config.audit(COMPONENT, stage, std::iter::empty());
        true
    }

    pub fn detach(&mut self) -> bool {
        let detached = self.teardown();
        if detached {
            self.config
                .audit(COMPONENT, BindingAuditStage::Detached, std::iter::empty());
        }
        detached
    }

    pub fn state(&self) -> SyncState {
        if self.active.is_some() {
            SyncState::Subscribed
        } else {
            SyncState::Unsubscribed
        }
    }

    /// Apply the current logical focus without waiting for a change, e.g.
    /// right after mounting. `None` while detached.
    pub fn sync_now(&self) -> Option<FocusOutcome> {
        let active = self.active.as_ref()?;
        Some(apply_and_report(&self.config, active.tree.as_ref()))
    }

    fn teardown(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.subscription.cancel();
                true
            }
            None => false,
        }
    }

    fn subscribe(&self, tree: TreeHandle) -> ActiveSync {
        let live = Rc::new(Cell::new(true));
        let weak = Rc::downgrade(&tree);
        let config = self.config.clone();
        let flag = live.clone();

        let registration = tree.register_listener(TreeListener::focus_change(
            move |change: &FocusChange| {
                debug_assert!(flag.get(), "focus listener fired after its sync detached");
                let Some(tree) = weak.upgrade() else {
                    return;
                };
                config.log(
                    COMPONENT,
                    LogLevel::Trace,
                    "focus_change",
                    [
                        json_kv("previous", json!(change.previous)),
                        json_kv("current", json!(change.current)),
                    ],
                );
                apply_and_report(&config, tree.as_ref());
            },
        ));
        self.config.record_metric(BindingMetrics::record_subscribe);
        self.config
            .log(COMPONENT, LogLevel::Debug, "listener_installed", std::iter::empty());

        let subscription = {
            let config = self.config.clone();
            Subscription::new(move || {
                live.set(false);
                registration.cancel();
                config.record_metric(BindingMetrics::record_unsubscribe);
                config.log(COMPONENT, LogLevel::Debug, "listener_removed", std::iter::empty());
            })
        };

        ActiveSync { tree, subscription }
    }
}

impl Drop for FocusSync {
    fn drop(&mut self) {
        self.detach();
    }
}

fn apply_and_report(config: &BindingConfig, tree: &dyn NavigationTree) -> FocusOutcome {
    let outcome = apply_logical_focus(tree);
    match &outcome {
        FocusOutcome::Applied(node) => {
            config.record_metric(BindingMetrics::record_focus_applied);
            config.log(
                COMPONENT,
                LogLevel::Debug,
                "focus_applied",
                [json_kv("node", json!(node))],
            );
            config.audit(
                COMPONENT,
                BindingAuditStage::FocusApplied,
                [json_kv("node", json!(node))],
            );
        }
        FocusOutcome::NoLogicalFocus | FocusOutcome::Unbound(_) => {
            let node = match &outcome {
                FocusOutcome::Unbound(node) => Some(node.as_str()),
                _ => None,
            };
            config.record_metric(BindingMetrics::record_focus_skipped);
            config.audit(
                COMPONENT,
                BindingAuditStage::FocusSkipped,
                [json_kv("node", json!(node))],
            );
        }
        FocusOutcome::Rejected { node, reason } => {
            config.record_metric(BindingMetrics::record_focus_rejected);
            config.log(
                COMPONENT,
                LogLevel::Warn,
                "focus_rejected",
                [
                    json_kv("node", json!(node)),
                    json_kv("reason", json!(reason)),
                ],
            );
            config.audit(
                COMPONENT,
                BindingAuditStage::FocusRejected,
                [json_kv("node", json!(node))],
            );
        }
    }
    outcome
}
