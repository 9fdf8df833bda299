use std::fmt;
use std::rc::Rc;

use crate::config::LazyRenderConfig;
use crate::render::RenderPipeline;
use crate::scheduler::Scheduler;
use crate::visibility::VisibilitySignal;

/// Services a lazy component works against.
///
/// Cloned into every component instance; there is no process-wide state.
#[derive(Clone)]
pub struct RenderContext {
    pub pipeline: Rc<dyn RenderPipeline>,
    pub visibility: Rc<dyn VisibilitySignal>,
    pub scheduler: Rc<dyn Scheduler>,
    pub config: LazyRenderConfig,
}

impl RenderContext {
    pub fn new(
        pipeline: Rc<dyn RenderPipeline>,
        visibility: Rc<dyn VisibilitySignal>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            pipeline,
            visibility,
            scheduler,
            config: LazyRenderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LazyRenderConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
