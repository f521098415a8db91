use std::cell::Cell;
use std::fmt;

use super::{HostElement, SharedFocus};
use crate::geometry::Rect;
use crate::{NavError, Result};

/// Terminal zone acting as a focusable host element.
///
/// The layout engine writes the solved rect with [`ZoneElement::set_rect`];
/// every [`HostElement::bounding_rect`] call reads it fresh and counts as one
/// measurement.
pub struct ZoneElement {
    id: String,
    rect: Cell<Option<Rect>>,
    focusable: Cell<bool>,
    measurements: Cell<u64>,
    focus: SharedFocus,
}

impl ZoneElement {
    pub fn new(id: impl Into<String>, focus: SharedFocus) -> Self {
        Self {
            id: id.into(),
            rect: Cell::new(None),
            focusable: Cell::new(true),
            measurements: Cell::new(0),
            focus,
        }
    }

    pub fn with_rect(self, rect: Rect) -> Self {
        self.rect.set(Some(rect));
        self
    }

    pub fn set_rect(&self, rect: Option<Rect>) {
        self.rect.set(rect);
    }

    pub fn set_focusable(&self, focusable: bool) {
        self.focusable.set(focusable);
        if !focusable {
            self.focus.blur(&self.id);
        }
    }

    pub fn measurements(&self) -> u64 {
        self.measurements.get()
    }

    pub fn has_focus(&self) -> bool {
        self.focus.focused_element().as_deref() == Some(self.id.as_str())
    }
}

impl HostElement for ZoneElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounding_rect(&self) -> Option<Rect> {
        self.measurements.set(self.measurements.get() + 1);
        self.rect.get()
    }

    fn focus(&self) -> Result<()> {
        if !self.focusable.get() {
            return Err(NavError::NotFocusable(self.id.clone()));
        }
        self.focus.set_focus(self.id.clone());
        Ok(())
    }
}

impl fmt::Debug for ZoneElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneElement")
            .field("id", &self.id)
            .field("rect", &self.rect.get())
            .field("focusable", &self.focusable.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FocusRegistry;
    use std::rc::Rc;

    #[test]
    fn focus_lands_in_registry() {
        let registry = Rc::new(FocusRegistry::new());
        let zone = ZoneElement::new("item1", registry.clone());
        zone.focus().unwrap();
        assert!(zone.has_focus());
        assert_eq!(registry.focused_element().as_deref(), Some("item1"));
    }

    #[test]
    fn unfocusable_zone_rejects_focus() {
        let registry = Rc::new(FocusRegistry::new());
        let zone = ZoneElement::new("item1", registry.clone());
        zone.focus().unwrap();
        zone.set_focusable(false);
        assert!(!zone.has_focus());
        assert!(matches!(zone.focus(), Err(NavError::NotFocusable(id)) if id == "item1"));
        assert_eq!(registry.transitions(), 1);
    }

    #[test]
    fn every_measurement_reads_the_current_rect() {
        let registry = Rc::new(FocusRegistry::new());
        let zone = ZoneElement::new("item1", registry).with_rect(Rect::new(0, 0, 4, 1));
        assert_eq!(zone.bounding_rect(), Some(Rect::new(0, 0, 4, 1)));
        zone.set_rect(Some(Rect::new(0, 2, 4, 1)));
        assert_eq!(zone.bounding_rect(), Some(Rect::new(0, 2, 4, 1)));
        zone.set_rect(None);
        assert_eq!(zone.bounding_rect(), None);
        assert_eq!(zone.measurements(), 3);
    }
}
