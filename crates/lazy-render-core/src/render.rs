//! Render pipeline service.
//!
//! Template resolution, compilation and animated insertion/removal are
//! owned by the host framework. Components drive them through
//! [`RenderPipeline`] and never touch elements directly.

use crate::completion::Completion;
use crate::element::ElementId;
use crate::scope::Scope;

/// Host-provided templating and animation operations.
pub trait RenderPipeline {
    /// Looks up a named template. `None` when the reference is unknown.
    fn resolve_template(&self, reference: &str) -> Option<String>;

    /// Compiles `markup` into a live element bound to `scope`.
    ///
    /// The element is detached until it is entered.
    fn compile(&self, markup: &str, scope: &Scope) -> ElementId;

    /// Last child currently attached to `parent`.
    fn last_child(&self, parent: ElementId) -> Option<ElementId>;

    /// Animates `element` into `parent`, right after `after` or as the first
    /// child when `after` is `None`.
    fn enter(&self, element: ElementId, parent: ElementId, after: Option<ElementId>) -> Completion;

    /// Animates `element` out and detaches it.
    fn leave(&self, element: ElementId) -> Completion;
}
