//! Deferred completion signals.
//!
//! Animated insertion and removal report back through a [`Completion`].
//! Hosts that run an executor can `.await` it; everything else chains
//! callbacks with [`Completion::then`] and [`Completion::all`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use smallvec::SmallVec;

type Callback = Box<dyn FnOnce()>;

#[derive(Default)]
struct CompletionInner {
    settled: bool,
    callbacks: SmallVec<[Callback; 2]>,
    waker: Option<Waker>,
}

/// A value that settles once, typically when an animation finishes.
#[derive(Clone)]
pub struct Completion {
    inner: Rc<RefCell<CompletionInner>>,
}

/// Write side of a pending [`Completion`].
pub struct Completer {
    inner: Rc<RefCell<CompletionInner>>,
}

impl Completion {
    /// Creates an unsettled completion together with the handle that settles it.
    pub fn pending() -> (Completion, Completer) {
        let inner = Rc::new(RefCell::new(CompletionInner::default()));
        (
            Completion {
                inner: Rc::clone(&inner),
            },
            Completer { inner },
        )
    }

    /// Creates an already settled completion.
    pub fn ready() -> Self {
        let (completion, completer) = Self::pending();
        completer.complete();
        completion
    }

    pub fn is_settled(&self) -> bool {
        self.inner.borrow().settled
    }

    /// Runs `callback` once this completion settles.
    ///
    /// Runs it immediately when already settled.
    pub fn then(&self, callback: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        if inner.settled {
            drop(inner);
            callback();
        } else {
            inner.callbacks.push(Box::new(callback));
        }
    }

    /// Settles once every completion in `completions` has settled.
    ///
    /// An empty input settles immediately.
    pub fn all<I>(completions: I) -> Completion
    where
        I: IntoIterator<Item = Completion>,
    {
        let (joined, completer) = Completion::pending();
        let completer = Rc::new(completer);
        // Starts at one so that inputs settling during setup cannot finish the join early.
        let remaining = Rc::new(Cell::new(1usize));

        let settle_one = {
            let remaining = Rc::clone(&remaining);
            let completer = Rc::clone(&completer);
            move || {
                let left = remaining.get() - 1;
                remaining.set(left);
                if left == 0 {
                    completer.complete();
                }
            }
        };

        for completion in completions {
            remaining.set(remaining.get() + 1);
            let settle_one = settle_one.clone();
            completion.then(settle_one);
        }
        settle_one();

        joined
    }
}

impl Completer {
    /// Settles the completion and runs its callbacks. Later calls do nothing.
    pub fn complete(&self) {
        let (callbacks, waker) = {
            let mut inner = self.inner.borrow_mut();
            if inner.settled {
                return;
            }
            inner.settled = true;
            (std::mem::take(&mut inner.callbacks), inner.waker.take())
        };

        for callback in callbacks {
            callback();
        }
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    pub fn is_settled(&self) -> bool {
        self.inner.borrow().settled
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.settled {
            return Poll::Ready(());
        }
        let stale = inner
            .waker
            .as_ref()
            .map_or(true, |waker| !waker.will_wake(cx.waker()));
        if stale {
            inner.waker = Some(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("settled", &self.is_settled())
            .finish()
    }
}
