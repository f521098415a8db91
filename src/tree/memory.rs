use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::json;

use super::{FocusChange, ListenerRegistry, NavigationTree, NodeFilter, TreeListener};
use crate::chain::{HandlerChain, NavigationAction, NodeContext, NodeId};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::subscription::Subscription;
use crate::{NavError, Result};

/// Id of the implicit root node.
pub const ROOT_ID: &str = "#";

const LOG_TARGET: &str = "room_nav::tree";

struct NodeEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    chain: HandlerChain,
}

struct TreeState {
    nodes: HashMap<NodeId, NodeEntry>,
    focused: Option<NodeId>,
}

/// In-memory navigation tree.
///
/// Child ids are `parent/local`, so a local id only has to be unique among its
/// siblings. Actions are resolved by the focused node's chain first, then by
/// each ancestor's chain, until one of them names a node to focus.
pub struct NodeTree {
    state: RefCell<TreeState>,
    listeners: ListenerRegistry,
    logger: Option<Logger>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_ID.to_string(),
            NodeEntry {
                parent: None,
                children: Vec::new(),
                chain: HandlerChain::new(),
            },
        );
        Self {
            state: RefCell::new(TreeState {
                nodes,
                focused: None,
            }),
            listeners: ListenerRegistry::new(),
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn insert(&self, parent: &str, local_id: &str, chain: HandlerChain) -> Result<NodeId> {
        if local_id.is_empty() || local_id.contains('/') || local_id == ROOT_ID {
            return Err(NavError::InvalidNodeId(local_id.to_string()));
        }

        let id = format!("{parent}/{local_id}");
        {
            let mut state = self.state.borrow_mut();
            if state.nodes.contains_key(&id) {
                return Err(NavError::DuplicateNode(id));
            }
            let parent_entry = state
                .nodes
                .get_mut(parent)
                .ok_or_else(|| NavError::UnknownNode(parent.to_string()))?;
            parent_entry.children.push(id.clone());
            state.nodes.insert(
                id.clone(),
                NodeEntry {
                    parent: Some(parent.to_string()),
                    children: Vec::new(),
                    chain,
                },
            );
        }

        self.log(LogLevel::Debug, "node_inserted", [json_kv("node", json!(id))]);
        Ok(id)
    }

    /// Remove `id` and its subtree. Logical focus inside the subtree falls back
    /// to the removed node's parent.
    pub fn remove(&self, id: &str) -> Result<()> {
        if id == ROOT_ID {
            return Err(NavError::RootRemoval);
        }

        let focus_was_inside = self
            .focused_id()
            .is_some_and(|focused| self.is_within(&focused, id));

        let parent = {
            let mut state = self.state.borrow_mut();
            let entry = state
                .nodes
                .remove(id)
                .ok_or_else(|| NavError::UnknownNode(id.to_string()))?;
            let mut pending = entry.children;
            while let Some(child) = pending.pop() {
                if let Some(removed) = state.nodes.remove(&child) {
                    pending.extend(removed.children);
                }
            }
            if let Some(parent) = entry.parent.as_deref().and_then(|p| state.nodes.get_mut(p)) {
                parent.children.retain(|child| child != id);
            }
            entry.parent
        };

        self.log(LogLevel::Debug, "node_removed", [json_kv("node", json!(id))]);
        if focus_was_inside {
            self.set_focused(parent);
        }
        Ok(())
    }

    pub fn set_handler(&self, id: &str, chain: HandlerChain) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let entry = state
            .nodes
            .get_mut(id)
            .ok_or_else(|| NavError::UnknownNode(id.to_string()))?;
        entry.chain = chain;
        Ok(())
    }

    /// Move logical focus to `id` directly, notifying listeners if it changed.
    pub fn focus(&self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(NavError::UnknownNode(id.to_string()));
        }
        self.set_focused(Some(id.to_string()));
        Ok(())
    }

    pub fn clear_focus(&self) {
        self.set_focused(None);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.borrow().nodes.contains_key(id)
    }

    pub fn children(&self, id: &str) -> Vec<NodeId> {
        self.state
            .borrow()
            .nodes
            .get(id)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn is_within(&self, node: &str, ancestor: &str) -> bool {
        let state = self.state.borrow();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = state
                .nodes
                .get(current)
                .and_then(|entry| entry.parent.as_deref());
        }
        false
    }

    fn set_focused(&self, next: Option<NodeId>) {
        let previous = {
            let mut state = self.state.borrow_mut();
            if state.focused == next {
                return;
            }
            std::mem::replace(&mut state.focused, next.clone())
        };

        self.log(
            LogLevel::Debug,
            "focus_changed",
            [
                json_kv("previous", json!(previous)),
                json_kv("current", json!(next)),
            ],
        );

        let change = FocusChange {
            previous,
            current: next,
        };
        self.listeners.notify(&change, |filter| match filter {
            NodeFilter::Any => true,
            NodeFilter::Subtree(root) => [&change.previous, &change.current]
                .into_iter()
                .flatten()
                .any(|id| self.is_within(id, root)),
        });
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, LOG_TARGET, message, fields));
        }
    }
}

impl NavigationTree for NodeTree {
    fn focused_id(&self) -> Option<NodeId> {
        self.state.borrow().focused.clone()
    }

    fn parent_of(&self, node: &str) -> Option<NodeId> {
        self.state
            .borrow()
            .nodes
            .get(node)
            .and_then(|entry| entry.parent.clone())
    }

    fn handler(&self, node: &str) -> Option<HandlerChain> {
        self.state
            .borrow()
            .nodes
            .get(node)
            .map(|entry| entry.chain.clone())
    }

    fn dispatch(&self, action: NavigationAction) -> Result<Option<NodeId>> {
        let mut cursor = self.focused_id().unwrap_or_else(|| ROOT_ID.to_string());
        loop {
            let target = self
                .handler(&cursor)
                .and_then(|chain| chain.navigate(&NodeContext::new(self, &cursor), action));

            if let Some(target) = target {
                if !self.contains(&target) {
                    return Err(NavError::UnknownNode(target));
                }
                let moved = self.focused_id().as_deref() != Some(target.as_str());
                self.log(
                    LogLevel::Trace,
                    "action_resolved",
                    [
                        json_kv("action", json!(action.as_str())),
                        json_kv("resolver", json!(cursor)),
                        json_kv("target", json!(target)),
                    ],
                );
                self.set_focused(Some(target.clone()));
                return Ok(moved.then_some(target));
            }

            match self.parent_of(&cursor) {
                Some(parent) => cursor = parent,
                None => return Ok(None),
            }
        }
    }

    fn register_listener(&self, listener: TreeListener) -> Subscription {
        self.listeners.register(listener)
    }
}
