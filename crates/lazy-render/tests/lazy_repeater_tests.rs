use std::cell::Cell;
use std::rc::Rc;

use lazy_render::{
    Attributes, Condition, ConditionBindings, ElementId, LazyRenderConfig, LazyRepeater,
    LazyRepeaterSpec, LazyRepeaterState, RepeatExpression,
};
use lazy_render_testing::{LazyTestRule, TreeEvent};

const MORE_MARKUP: &str = "<li class=\"more\">Loading...</li>";

struct Fixture {
    rule: LazyTestRule,
    list: ElementId,
    len: Rc<Cell<usize>>,
}

impl Fixture {
    fn new(len: usize, rendered: usize) -> Self {
        Self::with_config(len, rendered, LazyRenderConfig::default())
    }

    fn with_config(len: usize, rendered: usize, config: LazyRenderConfig) -> Self {
        let rule = LazyTestRule::with_config(config);
        rule.register_template("more.html", MORE_MARKUP);
        let list = rule.list(rendered);
        Self {
            rule,
            list,
            len: Rc::new(Cell::new(len)),
        }
    }

    fn mount(&self, spec: LazyRepeaterSpec) -> LazyRepeater {
        let len = Rc::clone(&self.len);
        LazyRepeater::mount(
            &self.rule.context(),
            self.rule.host_scope(),
            self.list,
            move || len.get(),
            spec,
        )
    }

    /// Scrolls the current placeholder into view, away first when needed.
    fn show_placeholder(&self, repeater: &LazyRepeater) {
        let placeholder = repeater.placeholder().expect("placeholder present");
        self.rule.scroll_back_to(placeholder);
    }
}

#[test]
fn limit_doubles_until_length() {
    let fixture = Fixture::new(100, 10);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10).with_placeholder("more.html"));

    assert_eq!(repeater.state(), LazyRepeaterState::Truncated);
    assert_eq!(repeater.limit(), Some(10));
    assert_eq!(
        fixture.rule.pipeline().children_markup(fixture.list).last().map(String::as_str),
        Some(MORE_MARKUP)
    );
    fixture.rule.settle_animations();
    let placeholder = repeater.placeholder().unwrap();
    assert!(fixture.rule.viewport().is_observed(placeholder));

    let mut limits = Vec::new();
    while repeater.placeholder().is_some() {
        fixture.show_placeholder(&repeater);
        limits.push(repeater.limit().unwrap());
    }

    assert_eq!(limits, vec![20, 40, 80, 100]);
    assert_eq!(repeater.state(), LazyRepeaterState::Full);
    assert_eq!(fixture.rule.viewport().observer_count(), 0);
    assert!(fixture.rule.pipeline().is_leaving(placeholder));

    fixture.rule.settle_animations();
    assert!(!fixture.rule.pipeline().is_attached(placeholder));

    // Stray signals after removal change nothing.
    repeater.on_visible(true);
    assert_eq!(repeater.limit(), Some(100));
}

#[test]
fn limit_is_monotonic_and_bounded() {
    for (len, initial) in [(7, 1), (33, 4), (64, 16), (1000, 3), (2, 1)] {
        let fixture = Fixture::new(len, initial);
        let repeater = fixture.mount(LazyRepeaterSpec::new(initial));
        fixture.rule.settle_animations();

        let mut previous = repeater.limit().unwrap();
        while repeater.placeholder().is_some() {
            fixture.show_placeholder(&repeater);
            let current = repeater.limit().unwrap();
            assert_eq!(current, (previous * 2).min(len));
            assert!(current >= previous && current <= len);
            previous = current;
        }
        assert_eq!(previous, len);
    }
}

#[test]
fn short_list_is_never_truncated() {
    let fixture = Fixture::new(5, 5);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10).with_placeholder("more.html"));

    assert_eq!(repeater.state(), LazyRepeaterState::Unbounded);
    assert_eq!(repeater.limit(), None);
    assert_eq!(repeater.placeholder(), None);
    assert_eq!(repeater.visible_len(), 5);

    // Growing the list later does not engage an unbounded repeater.
    fixture.len.set(50);
    repeater.sync_source_length();
    assert_eq!(repeater.placeholder(), None);
    assert_eq!(repeater.visible_len(), 50);
    assert_eq!(
        fixture
            .rule
            .pipeline()
            .count_events(|event| matches!(event, TreeEvent::Compiled(_))),
        0
    );
}

#[test]
fn limit_equal_to_length_is_not_applied() {
    let fixture = Fixture::new(10, 10);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10));
    assert_eq!(repeater.state(), LazyRepeaterState::Unbounded);
}

#[test]
fn false_condition_renders_everything() {
    let fixture = Fixture::new(100, 100);
    let repeater = fixture.mount(
        LazyRepeaterSpec::new(10)
            .with_placeholder("more.html")
            .with_condition(Condition::constant(false)),
    );

    assert_eq!(repeater.state(), LazyRepeaterState::Unbounded);
    assert_eq!(repeater.placeholder(), None);
    let items: Vec<usize> = (0..100).collect();
    assert_eq!(repeater.visible_items(&items).len(), 100);
}

#[test]
fn visible_items_follow_limit() {
    let fixture = Fixture::new(100, 10);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10));
    fixture.rule.settle_animations();
    let items: Vec<usize> = (0..100).collect();
    let handle = repeater.limit_handle();

    assert_eq!(repeater.visible_items(&items), &items[..10]);
    fixture.show_placeholder(&repeater);
    assert_eq!(handle.visible_items(&items), &items[..20]);
    assert_eq!(repeater.visible_len(), 20);
}

#[test]
fn source_growth_re_adds_placeholder() {
    let fixture = Fixture::new(20, 10);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10).with_placeholder("more.html"));
    fixture.rule.settle_animations();

    fixture.show_placeholder(&repeater);
    assert_eq!(repeater.limit(), Some(20));
    assert_eq!(repeater.state(), LazyRepeaterState::Full);
    fixture.rule.settle_animations();

    // Unchanged length: nothing to do.
    repeater.sync_source_length();
    assert_eq!(repeater.placeholder(), None);

    fixture.len.set(30);
    repeater.sync_source_length();
    assert_eq!(repeater.state(), LazyRepeaterState::Truncated);
    let placeholder = repeater.placeholder().unwrap();
    assert_eq!(
        fixture.rule.pipeline().children_markup(fixture.list).last().map(String::as_str),
        Some(MORE_MARKUP)
    );

    fixture.rule.settle_animations();
    fixture.rule.reveal(placeholder);
    assert_eq!(repeater.limit(), Some(30));
    assert_eq!(repeater.state(), LazyRepeaterState::Full);
}

#[test]
fn source_shrink_removes_placeholder() {
    let fixture = Fixture::new(100, 10);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10));
    fixture.rule.settle_animations();

    fixture.len.set(8);
    repeater.sync_source_length();
    assert_eq!(repeater.state(), LazyRepeaterState::Full);
    assert_eq!(repeater.placeholder(), None);
    assert_eq!(repeater.limit(), Some(10));
    assert_eq!(repeater.visible_len(), 8);
    assert_eq!(fixture.rule.viewport().observer_count(), 0);
}

#[test]
fn placeholder_goes_first_in_empty_list() {
    let fixture = Fixture::new(3, 0);
    fixture.rule.pipeline().append(fixture.list, "<li>0</li>");
    let repeater = fixture.mount(LazyRepeaterSpec::new(1).with_placeholder("more.html"));
    assert_eq!(
        fixture.rule.pipeline().children_markup(fixture.list),
        vec!["<li>0</li>", MORE_MARKUP]
    );

    let empty = Fixture::new(3, 0);
    let first = empty.mount(LazyRepeaterSpec::new(0).with_placeholder("more.html"));
    assert_eq!(
        empty.rule.pipeline().children(empty.list),
        vec![first.placeholder().unwrap()]
    );
    drop(repeater);
}

#[test]
fn zero_limit_grows_to_one() {
    let fixture = Fixture::new(3, 0);
    let repeater = fixture.mount(LazyRepeaterSpec::new(0));
    fixture.rule.settle_animations();

    fixture.show_placeholder(&repeater);
    assert_eq!(repeater.limit(), Some(1));
    fixture.show_placeholder(&repeater);
    assert_eq!(repeater.limit(), Some(2));
    fixture.show_placeholder(&repeater);
    assert_eq!(repeater.limit(), Some(3));
    assert_eq!(repeater.state(), LazyRepeaterState::Full);
}

#[test]
fn unknown_placeholder_reference_is_literal_markup() {
    let fixture = Fixture::new(50, 10);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10).with_placeholder("<em>more</em>"));
    let placeholder = repeater.placeholder().unwrap();
    assert_eq!(
        fixture.rule.pipeline().markup(placeholder).as_deref(),
        Some("<em>more</em>")
    );

    let bare = fixture.mount(LazyRepeaterSpec::new(10));
    assert_eq!(
        fixture.rule.pipeline().markup(bare.placeholder().unwrap()).as_deref(),
        Some("")
    );
}

#[test]
fn placeholder_already_in_view_grows_after_enter() {
    let fixture = Fixture::new(100, 10);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10));
    let placeholder = repeater.placeholder().unwrap();

    // Nobody observes the placeholder yet, so this only moves it into view.
    assert_eq!(fixture.rule.reveal(placeholder), 0);
    assert_eq!(repeater.limit(), Some(10));

    fixture.rule.settle_animations();
    assert_eq!(fixture.rule.viewport().recheck_count(), 1);
    assert_eq!(repeater.limit(), Some(20));
}

#[test]
fn no_recheck_after_enter_when_disabled() {
    let config = LazyRenderConfig::new().with_recheck_after_placeholder_enter(false);
    let fixture = Fixture::with_config(100, 10, config);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10));
    fixture.rule.reveal(repeater.placeholder().unwrap());

    fixture.rule.settle_animations();
    assert_eq!(fixture.rule.viewport().recheck_count(), 0);
    assert_eq!(repeater.limit(), Some(10));
}

#[test]
fn destroy_stops_growth() {
    let fixture = Fixture::new(100, 10);
    let repeater = fixture.mount(LazyRepeaterSpec::new(10));
    fixture.rule.settle_animations();
    let placeholder = repeater.placeholder().unwrap();

    repeater.destroy();
    assert_eq!(repeater.state(), LazyRepeaterState::Destroyed);
    assert_eq!(fixture.rule.viewport().observer_count(), 0);

    assert_eq!(fixture.rule.reveal(placeholder), 0);
    repeater.on_visible(true);
    repeater.sync_source_length();
    assert_eq!(repeater.limit(), Some(10));
    assert_eq!(repeater.placeholder(), None);
}

#[test]
fn repeater_outlives_dropped_handle() {
    let fixture = Fixture::new(40, 10);
    let limit = fixture.mount(LazyRepeaterSpec::new(10)).limit_handle();
    fixture.rule.settle_animations();

    let placeholder = fixture.rule.viewport().observed_elements()[0];
    assert_eq!(fixture.rule.reveal(placeholder), 1);
    assert_eq!(limit.get(), Some(20));

    fixture.rule.host_scope().dispose();
    assert_eq!(fixture.rule.viewport().observer_count(), 0);
}

#[test]
fn spec_and_expression_from_attributes() {
    let fixture = Fixture::new(100, 10);
    let attributes = Attributes::new()
        .set("ng-repeat", "obj in data track by obj.index")
        .set("lazy-repeater", "10")
        .set("lazy-placeholder", "more.html")
        .set("lazy-if", "ctrl.acceleratePageLoad");
    let bindings = ConditionBindings::new().bind("ctrl.acceleratePageLoad", Condition::constant(true));

    let expression = RepeatExpression::rewrite_default(attributes.get("ngRepeat").unwrap()).unwrap();
    assert_eq!(
        expression.rewritten,
        "obj in data | limitTo: getLazyLimit() track by obj.index"
    );
    assert_eq!(expression.source, "data");

    let spec = LazyRepeaterSpec::from_attributes(&attributes, &bindings).unwrap();
    let repeater = fixture.mount(spec);
    assert_eq!(repeater.limit(), Some(10));
    let placeholder = repeater.placeholder().unwrap();
    assert_eq!(
        fixture.rule.pipeline().markup(placeholder).as_deref(),
        Some(MORE_MARKUP)
    );
}
