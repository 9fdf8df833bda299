//! Lazily rendered module.
//!
//! A [`LazyModule`] shows a lightweight placeholder where caller-provided
//! content belongs, and swaps the real content in the first time the
//! placeholder is reported visible:
//!
//! ```text
//! [Placeholder] --(visible)--> [Swapping] --(enter + leave settle)--> [Swapped]
//! [Bypassed]  condition false at mount
//! [Destroyed] owning scope disposed
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use lazy_render_core::{
    run_after, Anchor, Completion, ElementId, RecheckPolicy, RenderContext, Scope, WeakScope,
};

use crate::condition::Condition;

/// Produces the transcluded content. Called at most once.
pub type ContentFactory = Box<dyn FnOnce(&Scope) -> ElementId>;

/// Parameters of a [`LazyModule`].
#[derive(Clone, Debug)]
pub struct LazyModuleSpec {
    /// Template reference of the placeholder. Unknown references render an
    /// empty placeholder.
    pub placeholder: String,
    /// The module is bypassed when this evaluates to `false` at mount.
    pub condition: Condition,
}

impl LazyModuleSpec {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            condition: Condition::always(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LazyModuleState {
    /// Placeholder rendered, waiting for a visibility signal.
    Placeholder,
    /// Content entering and placeholder leaving.
    Swapping,
    /// Swap finished.
    Swapped,
    /// Condition was false at mount; content rendered directly.
    Bypassed,
    /// Owning scope disposed.
    Destroyed,
}

struct LazyModuleInner {
    ctx: RenderContext,
    anchor: Anchor,
    scope: Scope,
    placeholder_scope: Option<Scope>,
    placeholder: Option<ElementId>,
    content: Option<ElementId>,
    factory: Option<ContentFactory>,
    state: LazyModuleState,
    visible: bool,
}

/// Placeholder-to-content swap driven by a visibility signal.
#[derive(Clone)]
pub struct LazyModule {
    inner: Rc<RefCell<LazyModuleInner>>,
}

impl LazyModule {
    /// Mounts the module at `anchor`.
    ///
    /// The module lives in a child of `host` and stays alive until that scope
    /// is disposed, whether or not the returned handle is kept. Disposing
    /// `host` (or calling [`destroy`](Self::destroy)) deregisters every
    /// callback it installed.
    pub fn mount(
        ctx: &RenderContext,
        host: &Scope,
        anchor: Anchor,
        spec: LazyModuleSpec,
        content: impl FnOnce(&Scope) -> ElementId + 'static,
    ) -> LazyModule {
        let scope = host.child();
        let module = LazyModule {
            inner: Rc::new(RefCell::new(LazyModuleInner {
                ctx: ctx.clone(),
                anchor,
                scope: scope.clone(),
                placeholder_scope: None,
                placeholder: None,
                content: None,
                factory: Some(Box::new(content)),
                state: LazyModuleState::Placeholder,
                visible: false,
            })),
        };

        // The scope owns the module; teardown releases it.
        let owned = Rc::clone(&module.inner);
        scope.on_dispose(move || {
            let mut inner = owned.borrow_mut();
            inner.state = LazyModuleState::Destroyed;
            inner.factory = None;
            inner.placeholder_scope = None;
        });

        if spec.condition.is_enabled() {
            module.render_placeholder(&spec.placeholder);
        } else {
            module.bypass();
        }
        module
    }

    fn bypass(&self) {
        let (ctx, anchor, scope, factory) = {
            let mut inner = self.inner.borrow_mut();
            inner.state = LazyModuleState::Bypassed;
            (
                inner.ctx.clone(),
                inner.anchor,
                inner.scope.clone(),
                inner.factory.take(),
            )
        };
        let Some(factory) = factory else {
            return;
        };

        log::debug!("lazy module: condition is false, rendering content directly");
        let content = factory(&scope);
        self.inner.borrow_mut().content = Some(content);
        // Nothing waits on a bypassed module's enter animation.
        let _entered = ctx.pipeline.enter(content, anchor.parent, anchor.after);
    }

    fn render_placeholder(&self, reference: &str) {
        let (ctx, anchor, scope) = {
            let inner = self.inner.borrow();
            (inner.ctx.clone(), inner.anchor, inner.scope.clone())
        };

        let markup = ctx.pipeline.resolve_template(reference).unwrap_or_else(|| {
            log::warn!("lazy module: placeholder template {reference:?} not found, rendering it empty");
            String::new()
        });
        let placeholder_scope = scope.child();
        let element = ctx.pipeline.compile(&markup, &placeholder_scope);
        {
            let mut inner = self.inner.borrow_mut();
            inner.placeholder = Some(element);
            inner.placeholder_scope = Some(placeholder_scope.clone());
        }
        log::debug!("lazy module: placeholder {element} rendered from {reference:?}");

        let weak = Rc::downgrade(&self.inner);
        let watch_scope = placeholder_scope.downgrade();
        let entered = ctx.pipeline.enter(element, anchor.parent, anchor.after);
        entered.then(move || {
            if !watch_scope.is_alive() {
                return;
            }
            let delay = ctx.config.observe_delay;
            let scheduler = Rc::clone(&ctx.scheduler);
            run_after(&*scheduler, delay, move || {
                Self::observe_placeholder(&ctx, weak, watch_scope, element);
            });
        });
    }

    fn observe_placeholder(
        ctx: &RenderContext,
        module: Weak<RefCell<LazyModuleInner>>,
        placeholder_scope: WeakScope,
        element: ElementId,
    ) {
        let Some(scope) = placeholder_scope.upgrade().filter(|scope| !scope.is_disposed()) else {
            return;
        };
        let subscription = ctx.visibility.observe(
            element,
            Rc::new(move |visible: bool| {
                if let Some(inner) = module.upgrade() {
                    LazyModule { inner }.on_visible(visible);
                }
            }),
        );
        scope.hold(subscription);
        if ctx.config.recheck_after_placeholder_enter {
            ctx.visibility.recheck();
        }
    }

    /// Handles a visibility signal for the placeholder.
    ///
    /// The first positive signal swaps the content in; every later signal,
    /// and any signal after destruction, is ignored.
    pub fn on_visible(&self, visible: bool) {
        let (ctx, anchor, scope, placeholder, placeholder_scope, factory) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != LazyModuleState::Placeholder {
                log::trace!("lazy module: ignoring signal in state {:?}", inner.state);
                return;
            }
            inner.visible = visible;
            if !visible {
                return;
            }
            let Some(factory) = inner.factory.take() else {
                return;
            };
            inner.state = LazyModuleState::Swapping;
            (
                inner.ctx.clone(),
                inner.anchor,
                inner.scope.clone(),
                inner.placeholder,
                inner.placeholder_scope.take(),
                factory,
            )
        };
        log::debug!("lazy module: placeholder visible, swapping in content");

        if let Some(placeholder_scope) = placeholder_scope {
            placeholder_scope.dispose();
        }

        let content = factory(&scope);
        self.inner.borrow_mut().content = Some(content);

        let entered = ctx.pipeline.enter(content, anchor.parent, anchor.after);
        let left = match placeholder {
            Some(element) => ctx.pipeline.leave(element),
            None => Completion::ready(),
        };

        if let RecheckPolicy::FixedDelay(delay) = ctx.config.recheck {
            let visibility = Rc::clone(&ctx.visibility);
            let alive = scope.downgrade();
            ctx.scheduler.schedule(
                delay,
                Box::new(move || {
                    if alive.is_alive() {
                        visibility.recheck();
                    }
                }),
            );
        }

        let weak = Rc::downgrade(&self.inner);
        let recheck_on_settle = ctx.config.recheck == RecheckPolicy::AfterSettle;
        let visibility = Rc::clone(&ctx.visibility);
        Completion::all([entered, left]).then(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let mut inner = inner.borrow_mut();
                if inner.state != LazyModuleState::Swapping {
                    return;
                }
                inner.state = LazyModuleState::Swapped;
                inner.placeholder = None;
            }
            log::debug!("lazy module: swap settled");
            if recheck_on_settle {
                visibility.recheck();
            }
        });
    }

    /// Disposes the module's scope. Later signals are no-ops.
    pub fn destroy(&self) {
        let scope = self.inner.borrow().scope.clone();
        if scope.dispose() {
            log::debug!("lazy module: destroyed");
        }
    }

    pub fn state(&self) -> LazyModuleState {
        self.inner.borrow().state
    }

    /// `true` once the swap has started.
    pub fn is_swapped(&self) -> bool {
        matches!(
            self.state(),
            LazyModuleState::Swapping | LazyModuleState::Swapped
        )
    }

    /// Last visibility reported while the placeholder was showing.
    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible
    }

    /// The placeholder element, until the swap settles.
    pub fn placeholder(&self) -> Option<ElementId> {
        self.inner.borrow().placeholder
    }

    /// The transcluded content, once rendered.
    pub fn content(&self) -> Option<ElementId> {
        self.inner.borrow().content
    }

    pub fn scope(&self) -> Scope {
        self.inner.borrow().scope.clone()
    }
}

impl fmt::Debug for LazyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LazyModule")
            .field("state", &inner.state)
            .field("anchor", &inner.anchor)
            .field("placeholder", &inner.placeholder)
            .field("content", &inner.content)
            .finish()
    }
}
