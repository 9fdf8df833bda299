//! In-memory render pipeline.
//!
//! Elements live in a flat map with parent/child links. Entering attaches an
//! element right away and leaves its animation pending; leaving keeps the
//! element attached until its animation settles. Pending animations settle
//! on [`TestRenderPipeline::settle_animations`], or immediately when instant
//! animations are enabled.

use std::cell::{Cell, RefCell};
use std::fmt::Write as _;

use lazy_render_core::collections::Map;
use lazy_render_core::{Completer, Completion, ElementId, RenderPipeline, Scope};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    Compiled(ElementId),
    Entered(ElementId),
    Left(ElementId),
    Detached(ElementId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AnimationKind {
    Enter,
    Leave,
}

struct PendingAnimation {
    element: ElementId,
    kind: AnimationKind,
    completer: Completer,
}

#[derive(Clone, Debug)]
struct TestNode {
    markup: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    leaving: bool,
}

#[derive(Default)]
struct TreeState {
    nodes: Map<ElementId, TestNode>,
    templates: Map<String, String>,
    pending: Vec<PendingAnimation>,
    events: Vec<TreeEvent>,
    next_id: u64,
}

impl TreeState {
    fn create(&mut self, markup: &str, parent: Option<ElementId>) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        self.nodes.insert(
            id,
            TestNode {
                markup: markup.to_owned(),
                parent: None,
                children: Vec::new(),
                leaving: false,
            },
        );
        if let Some(parent) = parent {
            self.attach(id, parent, self.last_child(parent));
        }
        id
    }

    fn last_child(&self, parent: ElementId) -> Option<ElementId> {
        self.nodes
            .get(&parent)
            .and_then(|node| node.children.last().copied())
    }

    fn attach(&mut self, element: ElementId, parent: ElementId, after: Option<ElementId>) {
        self.detach(element);
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            panic!("parent {parent} does not exist");
        };
        let index = match after {
            Some(sibling) => parent_node
                .children
                .iter()
                .position(|child| *child == sibling)
                .map_or(parent_node.children.len(), |position| position + 1),
            None => 0,
        };
        parent_node.children.insert(index, element);
        if let Some(node) = self.nodes.get_mut(&element) {
            node.parent = Some(parent);
            node.leaving = false;
        }
    }

    fn detach(&mut self, element: ElementId) {
        let parent = self
            .nodes
            .get_mut(&element)
            .and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.retain(|child| *child != element);
        }
    }
}

/// Headless [`RenderPipeline`] backed by an in-memory element tree.
#[derive(Default)]
pub struct TestRenderPipeline {
    state: RefCell<TreeState>,
    instant: Cell<bool>,
}

impl TestRenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settles every animation as soon as it starts.
    pub fn with_instant_animations(self, instant: bool) -> Self {
        self.instant.set(instant);
        self
    }

    pub fn set_instant_animations(&self, instant: bool) {
        self.instant.set(instant);
    }

    pub fn register_template(&self, name: &str, markup: &str) {
        self.state
            .borrow_mut()
            .templates
            .insert(name.to_owned(), markup.to_owned());
    }

    /// Creates a detached root element.
    pub fn create_root(&self, markup: &str) -> ElementId {
        self.state.borrow_mut().create(markup, None)
    }

    /// Creates an element and appends it to `parent` without animation.
    pub fn append(&self, parent: ElementId, markup: &str) -> ElementId {
        self.state.borrow_mut().create(markup, Some(parent))
    }

    /// Detaches `element` without animation.
    pub fn remove(&self, element: ElementId) {
        let mut state = self.state.borrow_mut();
        state.detach(element);
        state.events.push(TreeEvent::Detached(element));
    }

    pub fn children(&self, parent: ElementId) -> Vec<ElementId> {
        self.state
            .borrow()
            .nodes
            .get(&parent)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Markup of the children of `parent`, in order.
    pub fn children_markup(&self, parent: ElementId) -> Vec<String> {
        let state = self.state.borrow();
        state
            .nodes
            .get(&parent)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| state.nodes.get(child).map(|node| node.markup.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn markup(&self, element: ElementId) -> Option<String> {
        self.state
            .borrow()
            .nodes
            .get(&element)
            .map(|node| node.markup.clone())
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.state
            .borrow()
            .nodes
            .get(&element)
            .and_then(|node| node.parent)
    }

    pub fn is_attached(&self, element: ElementId) -> bool {
        self.parent(element).is_some()
    }

    pub fn is_leaving(&self, element: ElementId) -> bool {
        self.state
            .borrow()
            .nodes
            .get(&element)
            .is_some_and(|node| node.leaving)
    }

    pub fn events(&self) -> Vec<TreeEvent> {
        self.state.borrow().events.clone()
    }

    pub fn count_events(&self, matches: impl Fn(&TreeEvent) -> bool) -> usize {
        self.state.borrow().events.iter().filter(|event| matches(*event)).count()
    }

    pub fn pending_animations(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Settles pending animations, including ones started by completion
    /// callbacks, until none are left. Returns how many settled.
    pub fn settle_animations(&self) -> usize {
        let mut settled = 0;
        loop {
            let batch = std::mem::take(&mut self.state.borrow_mut().pending);
            if batch.is_empty() {
                return settled;
            }
            settled += batch.len();
            self.finish(batch);
        }
    }

    fn finish(&self, batch: Vec<PendingAnimation>) {
        {
            let mut state = self.state.borrow_mut();
            for animation in &batch {
                if animation.kind == AnimationKind::Leave {
                    state.detach(animation.element);
                    if let Some(node) = state.nodes.get_mut(&animation.element) {
                        node.leaving = false;
                    }
                    state.events.push(TreeEvent::Detached(animation.element));
                }
            }
        }
        for animation in batch {
            log::trace!("test renderer: {:?} of {} settled", animation.kind, animation.element);
            animation.completer.complete();
        }
    }

    fn start(&self, element: ElementId, kind: AnimationKind) -> Completion {
        let (completion, completer) = Completion::pending();
        let animation = PendingAnimation {
            element,
            kind,
            completer,
        };
        if self.instant.get() {
            self.finish(vec![animation]);
        } else {
            self.state.borrow_mut().pending.push(animation);
        }
        completion
    }

    /// Indented outline of the subtree under `root`.
    pub fn dump_tree(&self, root: ElementId) -> String {
        let state = self.state.borrow();
        let mut out = String::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((element, depth)) = stack.pop() {
            let Some(node) = state.nodes.get(&element) else {
                continue;
            };
            let leaving = if node.leaving { " (leaving)" } else { "" };
            let _ = writeln!(out, "{}{} {:?}{}", "  ".repeat(depth), element, node.markup, leaving);
            for child in node.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }
}

impl RenderPipeline for TestRenderPipeline {
    fn resolve_template(&self, reference: &str) -> Option<String> {
        self.state.borrow().templates.get(reference).cloned()
    }

    fn compile(&self, markup: &str, _scope: &Scope) -> ElementId {
        let mut state = self.state.borrow_mut();
        let element = state.create(markup, None);
        state.events.push(TreeEvent::Compiled(element));
        element
    }

    fn last_child(&self, parent: ElementId) -> Option<ElementId> {
        self.state.borrow().last_child(parent)
    }

    fn enter(&self, element: ElementId, parent: ElementId, after: Option<ElementId>) -> Completion {
        {
            let mut state = self.state.borrow_mut();
            state.attach(element, parent, after);
            state.events.push(TreeEvent::Entered(element));
        }
        self.start(element, AnimationKind::Enter)
    }

    fn leave(&self, element: ElementId) -> Completion {
        {
            let mut state = self.state.borrow_mut();
            if let Some(node) = state.nodes.get_mut(&element) {
                node.leaving = true;
            }
            state.events.push(TreeEvent::Left(element));
        }
        self.start(element, AnimationKind::Leave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_inserts_after_sibling() {
        let pipeline = TestRenderPipeline::new().with_instant_animations(true);
        let root = pipeline.create_root("root");
        let first = pipeline.append(root, "first");
        let _last = pipeline.append(root, "last");

        let inserted = pipeline.compile("middle", &Scope::new());
        assert!(!pipeline.is_attached(inserted));
        let done = pipeline.enter(inserted, root, Some(first));

        assert!(done.is_settled());
        assert_eq!(pipeline.children_markup(root), vec!["first", "middle", "last"]);
    }

    #[test]
    fn test_enter_without_sibling_goes_first() {
        let pipeline = TestRenderPipeline::new().with_instant_animations(true);
        let root = pipeline.create_root("root");
        pipeline.append(root, "existing");
        let element = pipeline.compile("head", &Scope::new());
        pipeline.enter(element, root, None);
        assert_eq!(pipeline.children_markup(root), vec!["head", "existing"]);
    }

    #[test]
    fn test_leave_detaches_on_settle() {
        let pipeline = TestRenderPipeline::new();
        let root = pipeline.create_root("root");
        let child = pipeline.append(root, "child");

        let done = pipeline.leave(child);
        assert!(pipeline.is_leaving(child));
        assert!(pipeline.is_attached(child));
        assert!(!done.is_settled());

        assert_eq!(pipeline.settle_animations(), 1);
        assert!(done.is_settled());
        assert!(!pipeline.is_attached(child));
    }

    #[test]
    fn test_dump_tree() {
        let pipeline = TestRenderPipeline::new();
        let root = pipeline.create_root("ul");
        let item = pipeline.append(root, "li");
        pipeline.append(item, "span");

        assert_eq!(
            pipeline.dump_tree(root),
            "#1 \"ul\"\n  #2 \"li\"\n    #3 \"span\"\n"
        );
    }
}
