use std::sync::Arc;

use threadview::data::{CountingGrowthCallback, RecordingRenderer, StaticThreadSource};
use threadview::post::{Loadable, Post, Thread};
use threadview::projection::{ListProjection, Row, RowKind, STATUS_ROW_ID};

fn thread(loadable: Loadable, nos: &[i64]) -> Thread {
    Thread::new(
        loadable,
        nos.iter()
            .map(|no| Post::new(format!("id{no}"), *no))
            .collect(),
    )
}

fn setup(
    thread: Thread,
) -> (
    Arc<StaticThreadSource>,
    Arc<CountingGrowthCallback>,
    Arc<RecordingRenderer>,
    ListProjection,
) {
    let source = Arc::new(StaticThreadSource::new(thread));
    let growth = Arc::new(CountingGrowthCallback::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let projection = ListProjection::new(source.clone(), growth.clone(), renderer.clone());
    (source, growth, renderer, projection)
}

fn nos(list: &[Arc<Post>]) -> Vec<i64> {
    list.iter().map(|post| post.no).collect()
}

#[test]
fn filter_then_clear_round_trip() {
    let initial = thread(Loadable::thread(), &[1, 2, 3]);
    let (_source, _growth, renderer, mut projection) = setup(initial.clone());
    projection.set_thread(&initial);

    let allowed = vec![Arc::new(Post::new("x", 1)), Arc::new(Post::new("y", 3))];
    projection.apply_filter(&allowed);
    assert_eq!(nos(projection.display()), vec![1, 3]);
    assert!(projection.is_filtering());

    projection.clear_filter();
    assert_eq!(nos(projection.display()), nos(projection.source()));

    let refreshes = renderer.refreshes();
    projection.clear_filter();
    assert_eq!(renderer.refreshes(), refreshes);
}

#[test]
fn highlight_selector_is_exclusive() {
    let (_source, _growth, _renderer, mut projection) =
        setup(thread(Loadable::thread(), &[]));
    projection.highlight_post_no(2);
    projection.highlight_post_id("x");

    assert!(!projection.is_highlighted(&Arc::new(Post::new("y", 2))));
    assert!(projection.is_highlighted(&Arc::new(Post::new("x", 5))));

    let pinned = Arc::new(Post::new("z", 9));
    projection.highlight_post(&pinned);
    assert!(projection.is_highlighted(&pinned));
    assert!(!projection.is_highlighted(&Arc::new(Post::new("x", 5))));
}

#[test]
fn status_row_in_thread_mode() {
    let (source, growth, _renderer, mut projection) =
        setup(thread(Loadable::thread(), &[1, 2, 3, 4, 5]));
    projection.reload();

    assert_eq!(projection.row_count(), 6);
    assert_eq!(projection.row_kind(5), RowKind::Status);
    assert_eq!(projection.item_id(5), Some(STATUS_ROW_ID));
    assert!(matches!(projection.bind_row(5), Some(Row::Status { error: None })));
    assert_eq!(growth.calls(), 1);

    source.set_loadable(Loadable::catalog());
    assert_eq!(projection.row_count(), 5);
}

#[test]
fn pagination_signal_follows_thread_growth() {
    let (source, growth, _renderer, mut projection) =
        setup(thread(Loadable::thread(), &[1, 2]));
    projection.reload();
    projection.bind_row(2);
    projection.bind_row(2);
    assert_eq!(growth.calls(), 1);

    source.set_posts(vec![Post::new("a", 1), Post::new("b", 2), Post::new("c", 3)]);
    projection.apply_filter(&[Arc::new(Post::new("a", 1))]);
    projection.reload();
    projection.on_trailing_row_bound();
    assert_eq!(growth.calls(), 1);

    projection.clear_filter();
    projection.on_trailing_row_bound();
    assert_eq!(growth.calls(), 2);
}
