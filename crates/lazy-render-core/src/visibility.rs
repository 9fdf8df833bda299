//! Visibility signal service.
//!
//! Intersection detection lives in the host. Components only see the
//! [`VisibilitySignal`] trait: subscribe an element, receive `bool`
//! notifications, and ask for a global recheck after layout shifts.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::collections::Map;
use crate::element::ElementId;

/// Callback invoked with `true` when the element enters the viewport and
/// `false` when it leaves.
pub type VisibilityCallback = Rc<dyn Fn(bool)>;

/// Reports when elements enter or leave the viewport.
pub trait VisibilitySignal {
    /// Invokes `callback` whenever the intersection state of `element` changes.
    ///
    /// The registration lives until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    fn observe(&self, element: ElementId, callback: VisibilityCallback) -> Subscription;

    /// Re-evaluates every pending registration. Called after layout changes.
    fn recheck(&self);
}

/// Handle to a visibility registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

struct Registration {
    element: ElementId,
    callback: VisibilityCallback,
    /// Last state delivered to the callback; `None` until the first report.
    last: Option<bool>,
}

#[derive(Default)]
struct RegistryInner {
    entries: Map<u64, Registration>,
    next_id: u64,
}

/// Registration bookkeeping for [`VisibilitySignal`] implementations.
///
/// Hosts feed intersection results in through [`report`](Self::report) or
/// [`recheck_with`](Self::recheck_with); callbacks fire only when an
/// element's state actually changes. Callbacks run outside of internal
/// borrows, so they may subscribe or unsubscribe re-entrantly.
#[derive(Clone, Default)]
pub struct VisibilityRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl VisibilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, element: ElementId, callback: VisibilityCallback) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.entries.insert(
                id,
                Registration {
                    element,
                    callback,
                    last: None,
                },
            );
            id
        };
        log::trace!("visibility: observing {element} (registration {id})");

        let registry: Weak<RefCell<RegistryInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = registry.upgrade() {
                let removed = inner.borrow_mut().entries.remove(&id);
                drop(removed);
            }
        })
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_observed(&self, element: ElementId) -> bool {
        self.inner
            .borrow()
            .entries
            .values()
            .any(|registration| registration.element == element)
    }

    /// Elements with at least one live registration, in registration order.
    pub fn observed_elements(&self) -> Vec<ElementId> {
        let inner = self.inner.borrow();
        let mut entries: Vec<_> = inner
            .entries
            .iter()
            .map(|(id, registration)| (*id, registration.element))
            .collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        let mut elements: Vec<ElementId> = Vec::with_capacity(entries.len());
        for (_, element) in entries {
            if !elements.contains(&element) {
                elements.push(element);
            }
        }
        elements
    }

    /// Delivers `visible` to every registration of `element` whose last
    /// known state differs. Returns the number of callbacks invoked.
    pub fn report(&self, element: ElementId, visible: bool) -> usize {
        self.dispatch(|candidate| (candidate == element).then_some(visible))
    }

    /// Re-evaluates every registration with `probe` and notifies changes.
    /// Returns the number of callbacks invoked.
    pub fn recheck_with(&self, probe: impl Fn(ElementId) -> bool) -> usize {
        self.dispatch(|element| Some(probe(element)))
    }

    fn dispatch(&self, state_of: impl Fn(ElementId) -> Option<bool>) -> usize {
        let mut pending: Vec<(u64, VisibilityCallback, bool)> = {
            let mut inner = self.inner.borrow_mut();
            inner
                .entries
                .iter_mut()
                .filter_map(|(id, registration)| {
                    let visible = state_of(registration.element)?;
                    if registration.last == Some(visible) {
                        return None;
                    }
                    registration.last = Some(visible);
                    Some((*id, Rc::clone(&registration.callback), visible))
                })
                .collect()
        };
        pending.sort_unstable_by_key(|(id, _, _)| *id);

        let mut invoked = 0;
        for (id, callback, visible) in pending {
            // An earlier callback may have torn this registration down.
            if !self.inner.borrow().entries.contains_key(&id) {
                continue;
            }
            callback(visible);
            invoked += 1;
        }
        invoked
    }
}

impl fmt::Debug for VisibilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityRegistry")
            .field("registrations", &self.len())
            .finish()
    }
}
