use std::fmt;

/// Opaque handle to an element owned by a [`RenderPipeline`](crate::RenderPipeline).
///
/// Components never look inside an element; they only hand the id back to
/// the pipeline or to the visibility service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Insertion point for content rendered by a component.
///
/// New content is entered into `parent` right after `after`, or as the first
/// child when `after` is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub parent: ElementId,
    pub after: Option<ElementId>,
}

impl Anchor {
    pub fn new(parent: ElementId, after: Option<ElementId>) -> Self {
        Self { parent, after }
    }

    /// Anchors right after `sibling` inside `parent`.
    pub fn after(parent: ElementId, sibling: ElementId) -> Self {
        Self::new(parent, Some(sibling))
    }

    /// Anchors at the start of `parent`.
    pub fn first_child_of(parent: ElementId) -> Self {
        Self::new(parent, None)
    }
}
