//! Tests for the asynchronous list view.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use horizon_grid::data::{
    AsyncListView, AsyncListViewProps, DataSourceState, DataSourceView, Editable, LoadState,
    RowKind,
};
use horizon_grid::{Error, SharedTaskQueue};

#[derive(Clone, Debug, PartialEq)]
struct Person {
    id: String,
    name: String,
}

fn person(id: &str) -> Person {
    Person {
        id: id.to_string(),
        name: id.to_uppercase(),
    }
}

type State = DataSourceState<(), String>;
type View = AsyncListView<Person, String, ()>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_grid=debug")
        .with_test_writer()
        .try_init();
}

/// Props whose fetch yields once before resolving and counts its calls.
fn counting_props(items: Vec<Person>, calls: Arc<AtomicUsize>) -> AsyncListViewProps<Person, String, ()> {
    AsyncListViewProps::new(
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let items = items.clone();
            async move {
                tokio::task::yield_now().await;
                Ok(items)
            }
        },
        |p: &Person| p.id.clone(),
    )
}

fn editable(state: State) -> Editable<State> {
    Editable::new(state, |_| {})
}

#[tokio::test]
async fn test_concurrent_loads_fetch_once() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let view = View::new(Arc::new(SharedTaskQueue::new()));
    view.update(
        editable(State::with_window(0, 10)),
        counting_props(vec![person("a"), person("b"), person("c")], calls.clone()),
    );

    let (first, second) = tokio::join!(view.load_data(), view.load_data());
    assert_eq!(first, Ok(()));
    assert_eq!(second, Ok(()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let rows = view.get_visible_rows();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.kind == RowKind::Item));
    assert_eq!(rows[2].value.as_ref().unwrap().name, "C");

    let list = view.get_list_props();
    assert_eq!(list.total_count, 3);
    assert!(list.exact_rows_count);
    assert!(!list.is_loading);
}

#[tokio::test]
async fn test_reload_shows_placeholders_and_fetches_again() {
    let calls = Arc::new(AtomicUsize::new(0));
    let view = View::new(Arc::new(SharedTaskQueue::new()));
    let props = counting_props(vec![person("a"), person("b")], calls.clone());
    view.update(editable(State::with_window(0, 4)), props.clone());
    view.load_data().await.unwrap();
    assert!(view.is_loaded());

    view.reload();
    assert_eq!(view.load_state(), LoadState::NotLoaded);
    let rows = view.get_visible_rows();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.kind == RowKind::Loading));
    assert!(view.get_list_props().is_reloading);

    view.update(editable(State::with_window(0, 4)), props);
    view.load_data().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(view.get_visible_rows().len(), 2);
    assert!(!view.get_list_props().is_reloading);
}

#[tokio::test]
async fn test_rows_changed_deferred_until_queue_runs() {
    let queue = Arc::new(SharedTaskQueue::new());
    let view = Arc::new(View::new(queue.clone()));
    view.update(
        editable(State::with_window(0, 10)),
        counting_props(vec![person("a"), person("b")], Arc::new(AtomicUsize::new(0))),
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let observed = view.clone();
    view.signals().rows_changed.connect(move |_| {
        seen_clone.lock().push(observed.get_visible_rows().len());
    });

    view.load_data().await.unwrap();
    assert!(seen.lock().is_empty());

    assert_eq!(queue.process_all(), 1);
    assert_eq!(*seen.lock(), vec![2]);
    view.signals().rows_changed.disconnect_all();
}

#[tokio::test]
async fn test_failed_fetch_reports_error() {
    let view = View::new(Arc::new(SharedTaskQueue::new()));
    let failures = Arc::new(Mutex::new(Vec::new()));
    let failures_clone = failures.clone();
    view.signals()
        .load_failed
        .connect(move |message: &String| failures_clone.lock().push(message.clone()));

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let props = AsyncListViewProps::new(
        move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::fetch("timeout")) }
        },
        |p: &Person| p.id.clone(),
    );
    view.update(editable(State::with_window(0, 3)), props);

    assert_eq!(view.load_data().await, Err(Error::fetch("timeout")));
    assert_eq!(view.load_data().await, Err(Error::fetch("timeout")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*failures.lock(), vec!["timeout".to_string()]);

    assert!(view.get_visible_rows().is_empty());
    let list = view.get_list_props();
    assert_eq!(list.load_error.as_deref(), Some("timeout"));
    assert_eq!(list.rows_count, 0);
    assert_eq!(view.get_by_id(&"a".to_string(), 0).kind, RowKind::Unknown);
}

#[tokio::test]
async fn test_unknown_id_after_load() {
    let view = View::new(Arc::new(SharedTaskQueue::new()));
    view.update(
        editable(State::with_window(0, 10)),
        counting_props(vec![person("a")], Arc::new(AtomicUsize::new(0))),
    );
    view.load_data().await.unwrap();

    let row = view.get_by_id(&"zz".to_string(), 5);
    assert_eq!(row.kind, RowKind::Unknown);
    assert_eq!(row.index, 5);
    assert_eq!(view.get_by_id(&"a".to_string(), 0).kind, RowKind::Item);
}

#[tokio::test]
async fn test_get_by_id_follows_load_state() {
    let view = View::new(Arc::new(SharedTaskQueue::new()));
    view.update(
        editable(State::with_window(0, 10)),
        counting_props(vec![person("a")], Arc::new(AtomicUsize::new(0))),
    );

    let before = view.get_by_id(&"a".to_string(), 4);
    assert_eq!(before.kind, RowKind::Unknown);
    assert_eq!(before.index, 4);

    // The fetch yields once, so the second branch observes the in-flight state.
    let (loaded, during) = tokio::join!(view.load_data(), async {
        (view.load_state(), view.get_by_id(&"a".to_string(), 4).kind)
    });
    assert_eq!(loaded, Ok(()));
    assert_eq!(during, (LoadState::Loading, RowKind::Loading));

    assert_eq!(view.get_by_id(&"a".to_string(), 4).kind, RowKind::Item);
}
