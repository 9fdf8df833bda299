//! Disposable scopes.
//!
//! A [`Scope`] owns the transient state of a component or of one of its
//! placeholders: teardown callbacks, visibility subscriptions and child
//! scopes. Disposal happens at most once, and disposing a parent disposes
//! every live child first.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::visibility::Subscription;

type Teardown = Box<dyn FnOnce()>;

#[derive(Default)]
struct ScopeInner {
    disposed: Cell<bool>,
    teardown: RefCell<SmallVec<[Teardown; 2]>>,
    children: RefCell<Vec<Weak<ScopeInner>>>,
}

impl ScopeInner {
    fn dispose(&self) -> bool {
        if self.disposed.replace(true) {
            return false;
        }

        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children.iter().filter_map(Weak::upgrade) {
            child.dispose();
        }

        let teardown = std::mem::take(&mut *self.teardown.borrow_mut());
        for callback in teardown.into_iter().rev() {
            callback();
        }
        true
    }
}

/// Transient state holder with an explicit, one-shot teardown.
#[derive(Clone, Default)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

/// Non-owning reference to a [`Scope`], for deferred callbacks.
#[derive(Clone, Default)]
pub struct WeakScope {
    inner: Weak<ScopeInner>,
}

impl Scope {
    /// Creates a root scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope that is disposed together with `self`.
    ///
    /// A child of an already disposed scope starts out disposed.
    pub fn child(&self) -> Scope {
        let child = Scope::new();
        if self.is_disposed() {
            child.dispose();
        } else {
            let mut children = self.inner.children.borrow_mut();
            children.retain(|weak| weak.strong_count() > 0);
            children.push(Rc::downgrade(&child.inner));
        }
        child
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Registers `callback` to run on disposal.
    ///
    /// Runs it right away when the scope is already disposed.
    pub fn on_dispose(&self, callback: impl FnOnce() + 'static) {
        if self.is_disposed() {
            callback();
            return;
        }
        self.inner.teardown.borrow_mut().push(Box::new(callback));
    }

    /// Keeps `subscription` alive until the scope is disposed.
    pub fn hold(&self, subscription: Subscription) {
        self.on_dispose(move || subscription.unsubscribe());
    }

    /// Disposes children, then runs teardown in reverse registration order.
    ///
    /// Returns `true` only for the call that actually performed the disposal.
    pub fn dispose(&self) -> bool {
        self.inner.dispose()
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl WeakScope {
    pub fn upgrade(&self) -> Option<Scope> {
        self.inner.upgrade().map(|inner| Scope { inner })
    }

    /// `true` while the scope exists and has not been disposed.
    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some_and(|scope| !scope.is_disposed())
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("disposed", &self.is_disposed())
            .field("teardown", &self.inner.teardown.borrow().len())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

impl fmt::Debug for WeakScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakScope")
            .field("alive", &self.is_alive())
            .finish()
    }
}
