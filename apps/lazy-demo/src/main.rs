//! Headless walkthrough of a feed page.
//!
//! A comments section is deferred behind a [`LazyModule`] and a 100-entry
//! feed is revealed by a [`LazyRepeater`]. The viewport is simulated by
//! `lazy-render-testing`, so the demo runs without a window.
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run -p lazy-demo --features logging
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use lazy_render::{LazyModule, LazyModuleSpec, LazyRepeater, LazyRepeaterSpec};
use lazy_render_testing::LazyTestRule;

const FEED_LEN: usize = 100;

fn main() {
    #[cfg(feature = "logging")]
    let _ = env_logger::try_init();

    let host = LazyTestRule::new();
    host.register_template("comments-placeholder.html", "<div class=\"skeleton\"></div>");
    host.register_template("load-more.html", "<li class=\"spinner\"></li>");
    host.pipeline().set_instant_animations(true);
    let ctx = host.context();

    let feed: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(
        (0..FEED_LEN).map(|index| format!("post #{index}")).collect(),
    ));
    let list = host.list(0);
    let source = Rc::clone(&feed);
    let repeater = LazyRepeater::mount(
        &ctx,
        host.host_scope(),
        list,
        move || source.borrow().len(),
        LazyRepeaterSpec::new(10).with_placeholder("load-more.html"),
    );
    println!("feed: showing {} of {}", repeater.visible_len(), FEED_LEN);

    while let Some(spinner) = repeater.placeholder() {
        host.scroll_back_to(spinner);
        println!("feed: scrolled to the spinner, showing {}", repeater.visible_len());
    }
    let shown = feed.borrow();
    let visible = repeater.visible_items(shown.as_slice());
    println!(
        "feed: fully revealed, last post is {:?}",
        visible.last().map(String::as_str).unwrap_or("<none>")
    );
    drop(shown);

    let pipeline = Rc::clone(&ctx.pipeline);
    let comments = LazyModule::mount(
        &ctx,
        host.host_scope(),
        host.anchor(),
        LazyModuleSpec::new("comments-placeholder.html"),
        move |scope| pipeline.compile("<section class=\"comments\">", scope),
    );
    println!("comments: {:?}", comments.state());

    if let Some(placeholder) = comments.placeholder() {
        host.reveal(placeholder);
    }
    host.run_until_idle();
    println!("comments: {:?}", comments.state());

    print!("{}", host.dump_tree());
    log::info!(
        "lazy-demo: {} visibility rechecks requested",
        host.viewport().recheck_count()
    );
}
