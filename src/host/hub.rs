use std::cell::{Cell, RefCell};
use std::time::Duration;

use crossterm::event::{self, Event};
use serde_json::json;

use super::{EventFlow, EventTarget, HostEventKind, HostHandler, ListenerId};
use crate::Result;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};

const LOG_TARGET: &str = "room_nav::host";

struct HubEntry {
    id: ListenerId,
    kind: HostEventKind,
    handler: HostHandler,
}

/// Event target fed with crossterm events.
///
/// Listeners run in registration order until one consumes the event. A
/// listener removed while an event is in flight does not see it.
#[derive(Default)]
pub struct EventHub {
    entries: RefCell<Vec<HubEntry>>,
    next_id: Cell<u64>,
    logger: Option<Logger>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Deliver `event` to the listeners of its kind. The first listener error
    /// stops delivery and is returned unchanged.
    pub fn emit(&self, event: &Event) -> Result<EventFlow> {
        let kind = HostEventKind::of(event);
        let snapshot: Vec<(ListenerId, HostHandler)> = self
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| (entry.id, entry.handler.clone()))
            .collect();

        let mut flow = EventFlow::Continue;
        let mut delivered = 0usize;
        for (id, handler) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            delivered += 1;
            if handler(event)? == EventFlow::Consumed {
                flow = EventFlow::Consumed;
                break;
            }
        }

        self.log(
            LogLevel::Trace,
            "event_delivered",
            [
                json_kv("kind", json!(kind.as_str())),
                json_kv("listeners", json!(delivered)),
                json_kv("consumed", json!(flow == EventFlow::Consumed)),
            ],
        );
        Ok(flow)
    }

    /// Wait up to `timeout` for one terminal event and deliver it.
    pub fn poll_terminal(&self, timeout: Duration) -> Result<Option<EventFlow>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = event::read()?;
        self.emit(&event).map(Some)
    }

    pub fn listener_count(&self, kind: HostEventKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|entry| entry.id == id)
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

impl EventTarget for EventHub {
    fn add_listener(&self, kind: HostEventKind, handler: HostHandler) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push(HubEntry { id, kind, handler });
        self.log(
            LogLevel::Trace,
            "listener_added",
            [
                json_kv("kind", json!(kind.as_str())),
                json_kv("listener", json!(id.0)),
            ],
        );
        id
    }

    fn remove_listener(&self, kind: HostEventKind, id: ListenerId) -> bool {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|entry| !(entry.id == id && entry.kind == kind));
            entries.len() != before
        };
        if removed {
            self.log(
                LogLevel::Trace,
                "listener_removed",
                [
                    json_kv("kind", json!(kind.as_str())),
                    json_kv("listener", json!(id.0)),
                ],
            );
        }
        removed
    }
}
