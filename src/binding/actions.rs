use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use serde_json::json;

use super::audit::BindingAuditStage;
use super::config::BindingConfig;
use crate::chain::NavigationAction;
use crate::host::{EventFlow, HostHandler, TargetHandle, same_target};
use crate::logging::{LogLevel, json_kv};
use crate::metrics::BindingMetrics;
use crate::subscription::Subscription;
use crate::tree::{TreeHandle, same_tree};
use crate::{NavError, Result};

const COMPONENT: &str = "actions";

/// Translates a host event into a navigation action, or `None` when the event
/// means nothing to navigation.
pub type EventMapping = Rc<dyn Fn(&Event) -> Option<NavigationAction>>;

thread_local! {
    static DEFAULT_MAPPING: EventMapping = Rc::new(map_key_event);
}

/// Terminal key bindings: arrows move, Enter/Space select, Esc/Backspace go
/// back, Tab/Shift-Tab cycle. Key releases are ignored.
pub fn map_key_event(event: &Event) -> Option<NavigationAction> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Up => Some(NavigationAction::Up),
        KeyCode::Down => Some(NavigationAction::Down),
        KeyCode::Left => Some(NavigationAction::Left),
        KeyCode::Right => Some(NavigationAction::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Some(NavigationAction::Select),
        KeyCode::Esc | KeyCode::Backspace => Some(NavigationAction::Back),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(NavigationAction::Prev),
        KeyCode::Tab => Some(NavigationAction::Next),
        KeyCode::BackTab => Some(NavigationAction::Prev),
        _ => None,
    }
}

/// Shared handle to [`map_key_event`]. Every call on a thread returns the same
/// handle, so passing it on each update does not force a re-subscription.
pub fn default_event_mapping() -> EventMapping {
    DEFAULT_MAPPING.with(Rc::clone)
}

pub fn same_mapping(a: &EventMapping, b: &EventMapping) -> bool {
    Rc::ptr_eq(a, b)
}

struct ActiveMapping {
    tree: TreeHandle,
    target: TargetHandle,
    mapping: EventMapping,
    subscription: Subscription,
}

/// Forwards host input to a navigation tree's dispatcher.
///
/// Holds at most one listener on one target. [`ActionMapper::update`] swaps
/// the listener when the tree, target or mapping handle changes; dropping the
/// mapper removes it.
pub struct ActionMapper {
    config: BindingConfig,
    active: Option<ActiveMapping>,
}

impl ActionMapper {
    pub fn new(config: BindingConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn attach(
        &mut self,
        tree: TreeHandle,
        target: TargetHandle,
        mapping: EventMapping,
    ) -> Result<()> {
        if self.active.is_some() {
            return Err(NavError::AlreadyAttached("action mapper"));
        }
        self.active = Some(self.subscribe(tree, target, mapping));
        self.config
            .audit(COMPONENT, BindingAuditStage::Attached, std::iter::empty());
        Ok(())
    }

    /// Re-run the subscription against possibly new dependencies. Returns
    /// `true` when a listener was (re)installed.
    pub fn update(&mut self, tree: TreeHandle, target: TargetHandle, mapping: EventMapping) -> bool {
        if let Some(active) = self.active.as_ref() {
            if same_tree(&active.tree, &tree)
                && same_target(&active.target, &target)
                && same_mapping(&active.mapping, &mapping)
            {
                return false;
            }
        }

        let replaced = self.teardown();
        self.active = Some(self.subscribe(tree, target, mapping));
        let stage = if replaced {
            BindingAuditStage::Resubscribed
        } else {
            BindingAuditStage::Attached
        };
        self.config.audit(COMPONENT, stage, std::iter::empty());
        true
    }

    /// Remove the listener. Returns `false` if nothing was attached.
    pub fn detach(&mut self) -> bool {
        let detached = self.teardown();
        if detached {
            self.config
                .audit(COMPONENT, BindingAuditStage::Detached, std::iter::empty());
        }
        detached
    }

    pub fn is_attached(&self) -> bool {
        self.active.is_some()
    }

    pub fn tree(&self) -> Option<&TreeHandle> {
        self.active.as_ref().map(|active| &active.tree)
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

    fn subscribe(
        &self,
        tree: TreeHandle,
        target: TargetHandle,
        mapping: EventMapping,
    ) -> ActiveMapping {
        let live = Rc::new(Cell::new(true));
        let kind = self.config.event_kind;

        let handler: HostHandler = {
            let tree = tree.clone();
            let mapping = mapping.clone();
            let live = live.clone();
            let config = self.config.clone();
            Rc::new(move |event: &Event| -> Result<EventFlow> {
                debug_assert!(live.get(), "action listener fired after its mapper detached");
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Release {
                        return Ok(EventFlow::Continue);
                    }
                }
                let Some(action) = mapping(event) else {
                    config.record_metric(BindingMetrics::record_unmapped);
                    config.audit(COMPONENT, BindingAuditStage::EventUnmapped, std::iter::empty());
                    return Ok(EventFlow::Continue);
                };

                config.record_metric(BindingMetrics::record_dispatch);
                config.log(
                    COMPONENT,
                    LogLevel::Trace,
                    "action_dispatched",
                    [json_kv("action", json!(action.as_str()))],
                );
                config.audit(
                    COMPONENT,
                    BindingAuditStage::ActionDispatched,
                    [json_kv("action", json!(action.as_str()))],
                );
                tree.dispatch(action)?;
                Ok(EventFlow::Continue)
            })
        };

        let id = target.add_listener(kind, handler);
        self.config.record_metric(BindingMetrics::record_subscribe);
        self.config.log(
            COMPONENT,
            LogLevel::Debug,
            "listener_installed",
            [
                json_kv("kind", json!(kind.as_str())),
                json_kv("listener", json!(id.0)),
            ],
        );

        let subscription = {
            let target = target.clone();
            let config = self.config.clone();
            Subscription::new(move || {
                live.set(false);
                target.remove_listener(kind, id);
                config.record_metric(BindingMetrics::record_unsubscribe);
                config.log(
                    COMPONENT,
                    LogLevel::Debug,
                    "listener_removed",
                    [
                        json_kv("kind", json!(kind.as_str())),
                        json_kv("listener", json!(id.0)),
                    ],
                );
            })
        };

        ActiveMapping {
            tree,
            target,
            mapping,
            subscription,
        }
    }
}

impl Drop for ActionMapper {
    fn drop(&mut self) {
        self.detach();
    }
}
