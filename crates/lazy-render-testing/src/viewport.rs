//! Controllable viewport.
//!
//! Tests decide which elements intersect the viewport; the viewport turns
//! those decisions into visibility callbacks through a
//! [`VisibilityRegistry`].

use std::cell::{Cell, RefCell};

use lazy_render_core::collections::Set;
use lazy_render_core::{
    ElementId, Subscription, VisibilityCallback, VisibilityRegistry, VisibilitySignal,
};

#[derive(Default)]
pub struct TestViewport {
    registry: VisibilityRegistry,
    in_view: RefCell<Set<ElementId>>,
    rechecks: Cell<usize>,
}

impl TestViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `element` into the viewport. Returns the callbacks invoked.
    pub fn reveal(&self, element: ElementId) -> usize {
        self.in_view.borrow_mut().insert(element);
        self.registry.report(element, true)
    }

    /// Moves `element` out of the viewport. Returns the callbacks invoked.
    pub fn hide(&self, element: ElementId) -> usize {
        self.in_view.borrow_mut().remove(&element);
        self.registry.report(element, false)
    }

    pub fn is_in_view(&self, element: ElementId) -> bool {
        self.in_view.borrow().contains(&element)
    }

    pub fn is_observed(&self, element: ElementId) -> bool {
        self.registry.is_observed(element)
    }

    pub fn observed_elements(&self) -> Vec<ElementId> {
        self.registry.observed_elements()
    }

    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of global rechecks requested so far.
    pub fn recheck_count(&self) -> usize {
        self.rechecks.get()
    }
}

impl VisibilitySignal for TestViewport {
    fn observe(&self, element: ElementId, callback: VisibilityCallback) -> Subscription {
        self.registry.register(element, callback)
    }

    fn recheck(&self) {
        self.rechecks.set(self.rechecks.get() + 1);
        self.registry
            .recheck_with(|element| self.in_view.borrow().contains(&element));
    }
}
