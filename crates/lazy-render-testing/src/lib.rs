//! Testing utilities and headless host for lazy-render
//!
//! [`LazyTestRule`] wires an in-memory element tree, a controllable
//! viewport and a virtual-time scheduler into a
//! [`RenderContext`](lazy_render_core::RenderContext).

pub mod scheduler;
pub mod test_renderer;
pub mod test_rule;
pub mod viewport;

pub use scheduler::ManualScheduler;
pub use test_renderer::{TestRenderPipeline, TreeEvent};
pub use test_rule::LazyTestRule;
pub use viewport::TestViewport;
