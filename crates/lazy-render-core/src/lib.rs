//! Core building blocks for lazily rendered views.
//!
//! The host framework supplies three services, injected through a
//! [`RenderContext`]:
//! - [`RenderPipeline`] - template lookup, compilation, animated enter/leave
//! - [`VisibilitySignal`] - viewport intersection notifications
//! - [`Scheduler`] - deferred tasks on the UI loop
//!
//! Everything is single-threaded: state lives in `Rc`/`RefCell`, and
//! [`Scope`] disposal is the one lifecycle rule components rely on to stop
//! receiving callbacks.

pub mod collections;
mod completion;
mod config;
mod context;
mod element;
mod render;
mod scheduler;
mod scope;
mod visibility;

pub use completion::{Completer, Completion};
pub use config::{LazyRenderConfig, RecheckPolicy};
pub use context::RenderContext;
pub use element::{Anchor, ElementId};
pub use render::RenderPipeline;
pub use scheduler::{run_after, Scheduler};
pub use scope::{Scope, WeakScope};
pub use visibility::{Subscription, VisibilityCallback, VisibilityRegistry, VisibilitySignal};
