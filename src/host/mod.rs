//! Host UI runtime surface: live elements, event targets and real input focus.
//!
//! The binding layer only talks to the host through [`HostElement`] and
//! [`EventTarget`]. [`EventHub`], [`ZoneElement`] and [`FocusRegistry`] are the
//! terminal-side implementations, fed by crossterm events.

mod focus;
mod hub;
mod zone;

use std::rc::Rc;

use crossterm::event::Event;

use crate::Result;
use crate::geometry::Rect;

pub use focus::{FocusRegistry, SharedFocus};
pub use hub::EventHub;
pub use zone::ZoneElement;

/// A live, mounted UI element.
pub trait HostElement {
    /// Stable identifier used in logs.
    fn id(&self) -> &str;

    /// Current bounding rectangle, measured now. `None` while the element has
    /// no layout.
    fn bounding_rect(&self) -> Option<Rect>;

    /// Give real input focus to this element.
    fn focus(&self) -> Result<()>;
}

pub type ElementRef = Rc<dyn HostElement>;

/// Same element behind both references.
pub fn same_element(a: &ElementRef, b: &ElementRef) -> bool {
    Rc::ptr_eq(a, b)
}

/// Control the propagation of a host event across listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
    Continue,
    Consumed,
}

/// Host event families a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    Key,
    Mouse,
    Paste,
    Focus,
    Resize,
}

impl HostEventKind {
    pub fn of(event: &Event) -> Self {
        match event {
            Event::Key(_) => Self::Key,
            Event::Mouse(_) => Self::Mouse,
            Event::Paste(_) => Self::Paste,
            Event::FocusGained | Event::FocusLost => Self::Focus,
            Event::Resize(_, _) => Self::Resize,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Mouse => "mouse",
            Self::Paste => "paste",
            Self::Focus => "focus",
            Self::Resize => "resize",
        }
    }
}

pub type HostHandler = Rc<dyn Fn(&Event) -> Result<EventFlow>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Something host events can be listened on.
pub trait EventTarget {
    fn add_listener(&self, kind: HostEventKind, handler: HostHandler) -> ListenerId;

    /// Returns `false` when no such listener was registered.
    fn remove_listener(&self, kind: HostEventKind, id: ListenerId) -> bool;
}

pub type TargetHandle = Rc<dyn EventTarget>;

/// Same target behind both handles.
pub fn same_target(a: &TargetHandle, b: &TargetHandle) -> bool {
    Rc::ptr_eq(a, b)
}
