//! Incrementally revealed lists.
//!
//! A [`LazyRepeater`] caps how many items of a list are rendered and
//! doubles the cap whenever a trailing "load more" placeholder becomes
//! visible:
//!
//! ```text
//! [Truncated] --(placeholder visible)--> [Truncated] or [Full]
//! [Full] --(source grows past the limit, on sync)--> [Truncated]
//! [Unbounded] condition false or limit >= length at mount
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use lazy_render_core::{run_after, ElementId, RenderContext, Scope};

use crate::condition::Condition;

/// Reads the current length of the repeated list.
pub type LengthSource = Rc<dyn Fn() -> usize>;

/// Parameters of a [`LazyRepeater`].
#[derive(Clone, Debug)]
pub struct LazyRepeaterSpec {
    /// Number of items shown before the first placeholder signal.
    pub initial_limit: usize,
    /// Template reference of the trailing placeholder. When no template is
    /// registered under it, the reference is used as literal markup.
    pub placeholder: Option<String>,
    /// The repeater is not applied when this evaluates to `false` at mount.
    pub condition: Condition,
}

impl LazyRepeaterSpec {
    pub fn new(initial_limit: usize) -> Self {
        Self {
            initial_limit,
            placeholder: None,
            condition: Condition::always(),
        }
    }

    pub fn with_placeholder(mut self, reference: impl Into<String>) -> Self {
        self.placeholder = Some(reference.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LazyRepeaterState {
    /// Showing `limit < length` items with a trailing placeholder.
    Truncated,
    /// Limit reached the length; placeholder removed.
    Full,
    /// Never applied; the whole list renders.
    Unbounded,
    /// Owning scope disposed.
    Destroyed,
}

/// Shared view of a repeater's current limit, for list rendering.
///
/// `None` means the list is not limited.
#[derive(Clone, Debug, Default)]
pub struct LimitHandle {
    limit: Rc<Cell<Option<usize>>>,
}

impl LimitHandle {
    pub fn get(&self) -> Option<usize> {
        self.limit.get()
    }

    /// Number of items to render out of `len`.
    pub fn visible_len(&self, len: usize) -> usize {
        self.get().map_or(len, |limit| limit.min(len))
    }

    /// The leading slice of `items` to render.
    pub fn visible_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible_len(items.len())]
    }

    fn set(&self, limit: Option<usize>) {
        self.limit.set(limit);
    }
}

/// Next limit after a placeholder signal: doubled and clamped to `len`,
/// never below the current limit. A zero limit grows to one.
pub fn next_limit(limit: usize, len: usize) -> usize {
    let doubled = if limit == 0 { 1 } else { limit.saturating_mul(2) };
    doubled.min(len).max(limit)
}

struct Placeholder {
    element: ElementId,
    scope: Scope,
}

struct LazyRepeaterInner {
    ctx: RenderContext,
    scope: Scope,
    parent: ElementId,
    source: LengthSource,
    markup: String,
    limit: LimitHandle,
    placeholder: Option<Placeholder>,
    state: LazyRepeaterState,
}

/// List limiter grown by a trailing placeholder.
#[derive(Clone)]
pub struct LazyRepeater {
    inner: Rc<RefCell<LazyRepeaterInner>>,
}

impl LazyRepeater {
    /// Mounts the repeater on the list rendered inside `parent`.
    ///
    /// `source` reports the current list length. The repeater applies only
    /// when the condition holds and the initial limit is below the length.
    /// It is owned by a child of `host` and outlives the returned handle.
    pub fn mount(
        ctx: &RenderContext,
        host: &Scope,
        parent: ElementId,
        source: impl Fn() -> usize + 'static,
        spec: LazyRepeaterSpec,
    ) -> LazyRepeater {
        let source: LengthSource = Rc::new(source);
        let len = source();
        let applied = spec.condition.is_enabled() && spec.initial_limit < len;

        let markup = spec
            .placeholder
            .as_deref()
            .map(|reference| {
                ctx.pipeline
                    .resolve_template(reference)
                    .unwrap_or_else(|| reference.to_owned())
            })
            .unwrap_or_default();

        let scope = host.child();
        let limit = LimitHandle::default();
        let repeater = LazyRepeater {
            inner: Rc::new(RefCell::new(LazyRepeaterInner {
                ctx: ctx.clone(),
                scope: scope.clone(),
                parent,
                source,
                markup,
                limit: limit.clone(),
                placeholder: None,
                state: LazyRepeaterState::Unbounded,
            })),
        };

        let owned = Rc::clone(&repeater.inner);
        scope.on_dispose(move || {
            let mut inner = owned.borrow_mut();
            inner.state = LazyRepeaterState::Destroyed;
            inner.placeholder = None;
        });

        if applied {
            log::debug!(
                "lazy repeater: limiting {len} items to {}",
                spec.initial_limit
            );
            limit.set(Some(spec.initial_limit));
            repeater.add_placeholder();
        } else {
            log::debug!("lazy repeater: not applied, rendering all {len} items");
        }
        repeater
    }

    fn add_placeholder(&self) {
        let (ctx, parent, markup, scope) = {
            let inner = self.inner.borrow();
            (
                inner.ctx.clone(),
                inner.parent,
                inner.markup.clone(),
                inner.scope.clone(),
            )
        };

        let placeholder_scope = scope.child();
        let element = ctx.pipeline.compile(&markup, &placeholder_scope);
        let after = ctx.pipeline.last_child(parent);
        {
            let mut inner = self.inner.borrow_mut();
            inner.placeholder = Some(Placeholder {
                element,
                scope: placeholder_scope.clone(),
            });
            inner.state = LazyRepeaterState::Truncated;
        }
        log::debug!("lazy repeater: placeholder {element} added");

        let weak = Rc::downgrade(&self.inner);
        let watch_scope = placeholder_scope.downgrade();
        let entered = ctx.pipeline.enter(element, parent, after);
        entered.then(move || {
            if !watch_scope.is_alive() {
                return;
            }
            let delay = ctx.config.observe_delay;
            let scheduler = Rc::clone(&ctx.scheduler);
            run_after(&*scheduler, delay, move || {
                let Some(scope) = watch_scope.upgrade().filter(|scope| !scope.is_disposed()) else {
                    return;
                };
                let subscription = ctx.visibility.observe(
                    element,
                    Rc::new(move |visible: bool| {
                        if let Some(inner) = weak.upgrade() {
                            LazyRepeater { inner }.on_visible(visible);
                        }
                    }),
                );
                scope.hold(subscription);
                if ctx.config.recheck_after_placeholder_enter {
                    ctx.visibility.recheck();
                }
            });
        });
    }

    fn remove_placeholder(&self) {
        let (ctx, placeholder) = {
            let mut inner = self.inner.borrow_mut();
            inner.state = LazyRepeaterState::Full;
            (inner.ctx.clone(), inner.placeholder.take())
        };
        if let Some(placeholder) = placeholder {
            log::debug!("lazy repeater: limit reached, removing placeholder {}", placeholder.element);
            placeholder.scope.dispose();
            let _left = ctx.pipeline.leave(placeholder.element);
        }
    }

    /// Handles a visibility signal for the trailing placeholder.
    ///
    /// A positive signal doubles the limit (clamped to the list length) and
    /// removes the placeholder once the whole list is shown.
    pub fn on_visible(&self, visible: bool) {
        if !visible {
            return;
        }
        let (source, limit) = {
            let inner = self.inner.borrow();
            if inner.state != LazyRepeaterState::Truncated || inner.placeholder.is_none() {
                log::trace!("lazy repeater: ignoring signal in state {:?}", inner.state);
                return;
            }
            (Rc::clone(&inner.source), inner.limit.clone())
        };

        let len = source();
        let current = limit.get().unwrap_or(len);
        let next = next_limit(current, len);
        limit.set(Some(next));
        log::debug!("lazy repeater: limit {current} -> {next} of {len}");

        if next >= len {
            self.remove_placeholder();
        }
    }

    /// Re-reads the source length.
    ///
    /// Re-adds the placeholder when the list grew past the limit after the
    /// placeholder was removed, and removes it when the list shrank to the
    /// limit. Hosts call this whenever the list may have changed.
    pub fn sync_source_length(&self) {
        let (source, limit, state, has_placeholder) = {
            let inner = self.inner.borrow();
            (
                Rc::clone(&inner.source),
                inner.limit.get(),
                inner.state,
                inner.placeholder.is_some(),
            )
        };
        if matches!(state, LazyRepeaterState::Unbounded | LazyRepeaterState::Destroyed) {
            return;
        }
        let Some(limit) = limit else {
            return;
        };

        let len = source();
        if limit < len && !has_placeholder {
            log::debug!("lazy repeater: list grew to {len} past limit {limit}");
            self.add_placeholder();
        } else if limit >= len && has_placeholder {
            self.remove_placeholder();
        }
    }

    /// Disposes the repeater's scope. Later signals and syncs are no-ops.
    pub fn destroy(&self) {
        let scope = self.inner.borrow().scope.clone();
        if scope.dispose() {
            log::debug!("lazy repeater: destroyed");
        }
    }

    pub fn state(&self) -> LazyRepeaterState {
        self.inner.borrow().state
    }

    /// Current limit; `None` when the list is not limited.
    pub fn limit(&self) -> Option<usize> {
        self.inner.borrow().limit.get()
    }

    /// Getter driving the limiting filter of the rendered list.
    pub fn limit_handle(&self) -> LimitHandle {
        self.inner.borrow().limit.clone()
    }

    /// Number of items to render right now.
    pub fn visible_len(&self) -> usize {
        let (source, limit) = {
            let inner = self.inner.borrow();
            (Rc::clone(&inner.source), inner.limit.clone())
        };
        limit.visible_len(source())
    }

    pub fn visible_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        self.limit_handle().visible_items(items)
    }

    pub fn placeholder(&self) -> Option<ElementId> {
        self.inner
            .borrow()
            .placeholder
            .as_ref()
            .map(|placeholder| placeholder.element)
    }

    pub fn scope(&self) -> Scope {
        self.inner.borrow().scope.clone()
    }
}

impl fmt::Debug for LazyRepeater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LazyRepeater")
            .field("state", &inner.state)
            .field("limit", &inner.limit.get())
            .field("parent", &inner.parent)
            .field(
                "placeholder",
                &inner.placeholder.as_ref().map(|placeholder| placeholder.element),
            )
            .finish()
    }
}
