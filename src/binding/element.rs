use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::chain::{
    ChainAction, HandlerChain, NODE_ELEMENT, NODE_POSITION, Next, NodeContext, Resolution,
};
use crate::geometry::Rect;
use crate::host::ElementRef;

/// Callback the host runtime invokes with the live element on mount and with
/// `None` on unmount.
pub type RefCallback = Rc<dyn Fn(Option<ElementRef>)>;

type ElementSlot = Rc<RefCell<Option<ElementRef>>>;

/// Per-node handler fragment exposing the node's live element and geometry.
///
/// One instance belongs to one mounted component. The element slot is only
/// written through [`ElementHandler::register`] (or the equivalent
/// [`ElementHandler::ref_callback`]); geometry is measured lazily, each time
/// the resolver asks for [`NODE_POSITION`].
pub struct ElementHandler {
    slot: ElementSlot,
    chain: HandlerChain,
}

impl Default for ElementHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementHandler {
    pub fn new() -> Self {
        let slot: ElementSlot = Rc::new(RefCell::new(None));

        let element_slot = slot.clone();
        let position_slot = slot.clone();
        let chain = HandlerChain::new()
            .meta(&NODE_ELEMENT, move || element_slot.borrow().clone())
            .meta(&NODE_POSITION, move || {
                let element = position_slot.borrow().clone();
                element.and_then(|element| element.bounding_rect())
            });

        Self { slot, chain }
    }

    /// Bind (`Some`) or unbind (`None`) the live element.
    pub fn register(&self, element: Option<ElementRef>) {
        *self.slot.borrow_mut() = element;
    }

    /// The [`ElementHandler::register`] operation as a standalone callback for
    /// the host's mount hooks.
    pub fn ref_callback(&self) -> RefCallback {
        let slot = self.slot.clone();
        Rc::new(move |element: Option<ElementRef>| *slot.borrow_mut() = element)
    }

    /// Chain carrying the element and position accessors.
    pub fn chain(&self) -> HandlerChain {
        self.chain.clone()
    }

    /// Chain with `layer` running ahead of the metadata accessors.
    pub fn prepend<F>(&self, layer: F) -> HandlerChain
    where
        F: Fn(&NodeContext<'_>, &ChainAction, Next<'_>) -> Option<Resolution> + 'static,
    {
        self.chain.prepend(layer)
    }

    pub fn element(&self) -> Option<ElementRef> {
        self.slot.borrow().clone()
    }

    /// Measure the bound element now; `None` when unmounted.
    pub fn position(&self) -> Option<Rect> {
        let element = self.element()?;
        element.bounding_rect()
    }

    pub fn is_mounted(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl Drop for ElementHandler {
    fn drop(&mut self) {
        self.slot.borrow_mut().take();
    }
}

impl fmt::Debug for ElementHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let element = self.slot.borrow();
        f.debug_struct("ElementHandler")
            .field("element", &element.as_ref().map(|e| e.id().to_string()))
            .field("chain", &self.chain)
            .finish()
    }
}
