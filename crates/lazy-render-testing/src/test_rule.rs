use std::rc::Rc;
use std::time::Duration;

use lazy_render_core::{
    Anchor, ElementId, LazyRenderConfig, RenderContext, RenderPipeline, Scheduler, Scope,
    VisibilitySignal,
};

use crate::scheduler::ManualScheduler;
use crate::test_renderer::TestRenderPipeline;
use crate::viewport::TestViewport;

/// Headless host for lazy components.
///
/// Owns a root element, a host scope and the three test services, and
/// hands out [`RenderContext`]s wired to them.
pub struct LazyTestRule {
    pipeline: Rc<TestRenderPipeline>,
    viewport: Rc<TestViewport>,
    scheduler: Rc<ManualScheduler>,
    host: Scope,
    root: ElementId,
    config: LazyRenderConfig,
}

impl LazyTestRule {
    pub fn new() -> Self {
        Self::with_config(LazyRenderConfig::default())
    }

    pub fn with_config(config: LazyRenderConfig) -> Self {
        let pipeline = Rc::new(TestRenderPipeline::new());
        let root = pipeline.create_root("root");
        Self {
            pipeline,
            viewport: Rc::new(TestViewport::new()),
            scheduler: Rc::new(ManualScheduler::new()),
            host: Scope::new(),
            root,
            config,
        }
    }

    pub fn context(&self) -> RenderContext {
        let pipeline: Rc<dyn RenderPipeline> = self.pipeline.clone();
        let visibility: Rc<dyn VisibilitySignal> = self.viewport.clone();
        let scheduler: Rc<dyn Scheduler> = self.scheduler.clone();
        RenderContext::new(pipeline, visibility, scheduler).with_config(self.config.clone())
    }

    pub fn host_scope(&self) -> &Scope {
        &self.host
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn pipeline(&self) -> &TestRenderPipeline {
        &self.pipeline
    }

    pub fn viewport(&self) -> &TestViewport {
        &self.viewport
    }

    pub fn scheduler(&self) -> &ManualScheduler {
        &self.scheduler
    }

    pub fn register_template(&self, name: &str, markup: &str) {
        self.pipeline.register_template(name, markup);
    }

    /// Appends a marker under the root and anchors right after it, the way
    /// a directive anchors on its own comment node.
    pub fn anchor(&self) -> Anchor {
        let marker = self.pipeline.append(self.root, "<!-- anchor -->");
        Anchor::after(self.root, marker)
    }

    /// Creates a list container under the root holding `items` entries.
    pub fn list(&self, items: usize) -> ElementId {
        let list = self.pipeline.append(self.root, "<ul>");
        for index in 0..items {
            self.pipeline.append(list, &format!("<li>{index}</li>"));
        }
        list
    }

    /// Content factory body: compiles `markup` into a detached element.
    pub fn compile(&self, markup: &str, scope: &Scope) -> ElementId {
        self.pipeline.compile(markup, scope)
    }

    pub fn reveal(&self, element: ElementId) -> usize {
        self.viewport.reveal(element)
    }

    pub fn hide(&self, element: ElementId) -> usize {
        self.viewport.hide(element)
    }

    /// Hides then reveals `element`, as when scrolling away and back.
    pub fn scroll_back_to(&self, element: ElementId) -> usize {
        self.viewport.hide(element);
        self.viewport.reveal(element)
    }

    pub fn settle_animations(&self) -> usize {
        self.pipeline.settle_animations()
    }

    pub fn advance(&self, by: Duration) -> usize {
        self.scheduler.advance(by)
    }

    /// Settles animations and runs scheduled tasks until neither has work.
    pub fn run_until_idle(&self) {
        loop {
            let settled = self.pipeline.settle_animations();
            let ran = self.scheduler.run_until_idle();
            if settled == 0 && ran == 0 {
                return;
            }
        }
    }

    /// Markup of the root's children, in order.
    pub fn root_markup(&self) -> Vec<String> {
        self.pipeline.children_markup(self.root)
    }

    pub fn dump_tree(&self) -> String {
        self.pipeline.dump_tree(self.root)
    }
}

impl Default for LazyTestRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LazyTestRule {
    fn drop(&mut self) {
        self.host.dispose();
    }
}
