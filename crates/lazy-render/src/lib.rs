//! Viewport-deferred rendering components.
//!
//! - [`LazyModule`] renders a placeholder until it scrolls into view, then
//!   swaps in the real content.
//! - [`LazyRepeater`] renders the head of a list and doubles how much it
//!   shows each time a trailing placeholder scrolls into view.
//!
//! Both work against the services of a [`RenderContext`]:
//!
//! ```rust,ignore
//! let module = LazyModule::mount(
//!     &ctx,
//!     &host_scope,
//!     Anchor::after(parent, marker),
//!     LazyModuleSpec::new("chart-placeholder.html"),
//!     |scope| render_chart(scope),
//! );
//!
//! let repeater = LazyRepeater::mount(
//!     &ctx,
//!     &host_scope,
//!     list_element,
//!     move || rows.borrow().len(),
//!     LazyRepeaterSpec::new(10).with_placeholder("load-more.html"),
//! );
//! let shown = repeater.visible_items(&rows.borrow());
//! ```

pub mod attributes;
mod condition;
mod lazy_module;
mod lazy_repeater;
mod repeat_expr;

pub use attributes::{AttributeError, Attributes, ConditionBindings};
pub use condition::Condition;
pub use lazy_module::{ContentFactory, LazyModule, LazyModuleSpec, LazyModuleState};
pub use lazy_repeater::{
    next_limit, LazyRepeater, LazyRepeaterSpec, LazyRepeaterState, LengthSource, LimitHandle,
};
pub use repeat_expr::{RepeatExpression, DEFAULT_LIMIT_GETTER};

pub use lazy_render_core::{
    Anchor, Completion, ElementId, LazyRenderConfig, RecheckPolicy, RenderContext, RenderPipeline,
    Scheduler, Scope, Subscription, VisibilityRegistry, VisibilitySignal,
};
