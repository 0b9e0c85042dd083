mod common;

use common::{MockPlugin, Mode, item, items};
use dayboard_core::aggregate::{AggregatePlugin, MAX_ITEMS};
use dayboard_core::plugin::{
    FetchContext, FetchResult, NewsItem, Plugin, PluginError, PluginHandle, Taggable,
};
use std::time::Duration;

fn ctx() -> FetchContext {
    FetchContext::with_timeout(Duration::from_secs(30))
}

fn titles(result: FetchResult) -> Vec<String> {
    match result {
        FetchResult::News(items) => items.into_iter().map(|i| i.title).collect(),
        other => panic!("expected news, got {other:?}"),
    }
}

// ============================================================================
// Partial and total failure
// ============================================================================

#[tokio::test]
async fn test_partial_failure_returns_successful_children() {
    let (a, _) = MockPlugin::news("a", items("a", 5), &[]);
    let (b, b_control) = MockPlugin::news("b", vec![], &[]);
    b_control.set_mode(Mode::Fail);

    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(a), PluginHandle::shared(b)]);
    let result = aggregate.fetch(ctx()).await.unwrap();

    assert_eq!(titles(result), vec!["a 0", "a 1", "a 2", "a 3", "a 4"]);
}

#[tokio::test]
async fn test_total_failure_without_cache_errors() {
    let (a, a_control) = MockPlugin::news("a", vec![], &[]);
    let (b, b_control) = MockPlugin::news("b", vec![], &[]);
    a_control.set_mode(Mode::Fail);
    b_control.set_mode(Mode::Fail);

    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(a), PluginHandle::shared(b)]);
    let err = aggregate.fetch(ctx()).await.unwrap_err();
    assert!(matches!(err, PluginError::Fetch { .. }));
}

#[tokio::test]
async fn test_total_failure_with_cache_returns_cache() {
    let (a, a_control) = MockPlugin::news("a", items("a", 2), &[]);
    let (b, b_control) = MockPlugin::news("b", items("b", 1), &[]);
    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(a), PluginHandle::shared(b)]);

    let first = titles(aggregate.fetch(ctx()).await.unwrap());
    assert_eq!(first, vec!["a 0", "a 1", "b 0"]);

    a_control.set_mode(Mode::Fail);
    b_control.set_mode(Mode::Fail);
    let second = titles(aggregate.fetch(ctx()).await.unwrap());
    assert_eq!(second, first);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_child_gives_up_before_the_aggregate_deadline() {
    let (fast, _) = MockPlugin::news("fast", items("a", 5), &[]);
    let (slow, slow_control) = MockPlugin::news("slow", vec![], &[]);
    slow_control.set_mode(Mode::Stall);

    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(fast), PluginHandle::shared(slow)]);
    let ctx = ctx();
    let result = aggregate.fetch(ctx.clone()).await.unwrap();

    assert_eq!(titles(result), vec!["a 0", "a 1", "a 2", "a 3", "a 4"]);
    assert!(ctx.remaining() > Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_hung_child_is_abandoned_before_the_aggregate_deadline() {
    let (fast, _) = MockPlugin::news("fast", items("a", 2), &[]);
    let (hung, hung_control) = MockPlugin::news("hung", vec![], &[]);
    hung_control.set_mode(Mode::Hang);

    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(hung), PluginHandle::shared(fast)]);
    let ctx = ctx();
    let result = aggregate.fetch(ctx.clone()).await.unwrap();

    assert_eq!(titles(result), vec!["a 0", "a 1"]);
    assert!(ctx.remaining() > Duration::ZERO);
    assert_eq!(hung_control.fetch_count(), 1);
}

#[tokio::test]
async fn test_panicking_child_is_contained() {
    let (a, a_control) = MockPlugin::news("a", vec![], &[]);
    let (b, _) = MockPlugin::news("b", items("b", 2), &[]);
    a_control.set_mode(Mode::Panic);

    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(a), PluginHandle::shared(b)]);
    let result = aggregate.fetch(ctx()).await.unwrap();
    assert_eq!(titles(result), vec!["b 0", "b 1"]);
}

// ============================================================================
// Merge, filter, truncate
// ============================================================================

#[tokio::test]
async fn test_merge_preserves_child_order_and_truncates() {
    let (a, _) = MockPlugin::news("a", items("a", 8), &[]);
    let (b, _) = MockPlugin::news("b", items("b", 8), &[]);
    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(a), PluginHandle::shared(b)]);

    let result = titles(aggregate.fetch(ctx()).await.unwrap());
    assert_eq!(result.len(), MAX_ITEMS);
    assert_eq!(result[0], "a 0");
    assert_eq!(result[7], "a 7");
    assert_eq!(result[8], "b 0");
    assert_eq!(result[11], "b 3");
}

#[tokio::test]
async fn test_tag_filter_applies_after_merge() {
    // The mock children ignore their tag, so only the aggregate filters.
    let (a, _) = MockPlugin::news("a", vec![item("golang news"), item("python")], &["golang"]);
    let mut tagged = item("weekly roundup");
    tagged.tags = vec!["GoLang".into()];
    let mut described = item("release");
    described.description = "new golang toolchain".into();
    let (b, _) = MockPlugin::news("b", vec![tagged, described, item("rust")], &[]);

    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(a), PluginHandle::shared(b)]);

    aggregate.set_current_tag("golang");
    let filtered = titles(aggregate.fetch(ctx()).await.unwrap());
    assert_eq!(filtered, vec!["golang news", "weekly roundup", "release"]);

    aggregate.set_current_tag("all");
    let unfiltered = titles(aggregate.fetch(ctx()).await.unwrap());
    assert_eq!(unfiltered.len(), 5);
}

#[tokio::test]
async fn test_active_tag_is_propagated_to_children() {
    let (a, a_control) = MockPlugin::news("a", vec![], &[]);
    let (b, b_control) = MockPlugin::news("b", vec![], &[]);
    let a = PluginHandle::shared(a);
    let b = PluginHandle::shared(b);
    // Child b was set independently elsewhere
    b.as_taggable().unwrap().set_current_tag("python");

    let aggregate = AggregatePlugin::new(vec![a, b.clone()]);
    aggregate.set_current_tag("security");
    aggregate.fetch(ctx()).await.unwrap();

    assert_eq!(a_control.last_seen_tag().as_deref(), Some("security"));
    assert_eq!(b_control.last_seen_tag().as_deref(), Some("security"));
    assert_eq!(b.as_taggable().unwrap().current_tag(), "security");
}

#[tokio::test]
async fn test_supported_tags_union() {
    let (a, _) = MockPlugin::news("a", vec![], &["golang", "ai"]);
    let (b, _) = MockPlugin::news("b", vec![], &["ai", "rust"]);
    let aggregate =
        AggregatePlugin::new(vec![PluginHandle::shared(a), PluginHandle::shared(b)]);

    assert_eq!(
        aggregate.supported_tags(),
        vec!["all", "golang", "ai", "rust"]
    );
    assert_eq!(aggregate.identity(), "aggregate-news");
    assert_eq!(aggregate.category(), "news");
}

#[tokio::test]
async fn test_configure_limits_items() {
    let (a, _) = MockPlugin::news("a", items("a", 6), &[]);
    let mut aggregate = AggregatePlugin::new(vec![PluginHandle::shared(a)]);
    let options: toml::Table = toml::from_str("max_items = 3").unwrap();
    aggregate.configure(&options).unwrap();

    let result = titles(aggregate.fetch(ctx()).await.unwrap());
    assert_eq!(result.len(), 3);
    assert_eq!(aggregate.metadata().config["max_items"], "3");
}

#[tokio::test]
async fn test_inactive_children_do_not_count_as_success() {
    let (a, a_control) = MockPlugin::news("a", vec![], &[]);
    a_control.set_mode(Mode::Fail);
    let b = PluginHandle::shared(MockPlugin::news("b", vec![NewsItem::default()], &[]).0);
    b.teardown().unwrap();

    let aggregate = AggregatePlugin::new(vec![PluginHandle::shared(a), b]);
    assert!(aggregate.fetch(ctx()).await.is_err());
}
