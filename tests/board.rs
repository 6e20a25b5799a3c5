//! Scenarios that go through a Board, with a mocked task store

use std::sync::Arc;

use chrono::NaiveDate;

use deadline_board::deadlines::{DATE_FORMAT, DEADLINES_KEY};
use deadline_board::mock_behaviour::MockBehaviour;
use deadline_board::mock_source::MockTaskSource;
use deadline_board::store::MemoryStore;
use deadline_board::theme::THEME_KEY;
use deadline_board::{Board, Task, TaskId, TaskStatus};

type TestBoard = Board<Arc<MockTaskSource>, Arc<MemoryStore>>;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
}

fn task(id: u64, title: &str, status: TaskStatus) -> Task {
    Task::new(TaskId::from(id), title.to_string(), String::new(), status, None)
}

async fn test_board() -> (Arc<MockTaskSource>, Arc<MemoryStore>, TestBoard) {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = Arc::new(MockTaskSource::new());
    source.insert_task(task(1, "Buy milk", TaskStatus::Pending));
    source.insert_task(task(2, "Call mom", TaskStatus::Completed));
    let store = Arc::new(MemoryStore::new());

    let board = Board::new(source.clone(), store.clone());
    (source, store, board)
}

#[tokio::test]
async fn loading_fetches_tasks_and_local_data() {
    let (_source, store, mut board) = test_board().await;
    store.insert_raw_blob(THEME_KEY, "ocean");
    store.insert_raw_blob(DEADLINES_KEY, r#"{"2024-03-10":[1]}"#);

    assert!(board.load().await);
    assert_eq!(board.tasks().len(), 2);
    assert_eq!(board.theme().current_theme(), "ocean");
    assert_eq!(board.error(), None);

    let due = board.tasks_due(date("2024-03-10")).await;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].title(), "Buy milk");
}

#[tokio::test]
async fn deleting_a_task_clears_its_deadline() {
    let (source, store, mut board) = test_board().await;
    board.load().await;
    board.assign_deadline(&TaskId::from(1u64), date("2024-03-10")).await;
    board.assign_deadline(&TaskId::from(2u64), date("2024-03-10")).await;

    assert!(board.delete_task(&TaskId::from(1u64)).await);
    assert_eq!(source.tasks().len(), 1);
    assert_eq!(board.deadlines().deadline_for(&TaskId::from(1u64)).await, None);
    assert_eq!(store.raw_blob(DEADLINES_KEY).unwrap(), r#"{"2024-03-10":[2]}"#);
}

#[tokio::test]
async fn failed_deletions_keep_the_deadline() {
    let (source, _store, mut board) = test_board().await;
    board.load().await;
    board.assign_deadline(&TaskId::from(1u64), date("2024-03-10")).await;

    source.set_behaviour(MockBehaviour::fail_now(1));
    assert_eq!(board.delete_task(&TaskId::from(1u64)).await, false);
    assert!(board.error().unwrap().contains("Unable to delete task 1"));
    assert_eq!(board.tasks().len(), 2);
    assert_eq!(board.deadlines().deadline_for(&TaskId::from(1u64)).await, Some(date("2024-03-10")));
}

#[tokio::test]
async fn refresh_errors_keep_the_previous_tasks() {
    let (source, _store, mut board) = test_board().await;
    assert!(board.load().await);

    source.set_behaviour(MockBehaviour::fail_now(1));
    assert_eq!(board.refresh().await, false);
    assert_eq!(board.tasks().len(), 2);
    assert!(board.error().is_some());

    // Errors are not retried automatically, but the next refresh works
    assert!(board.refresh().await);
    assert_eq!(board.error(), None);
}

#[tokio::test]
async fn refresh_forgets_deadlines_of_remotely_deleted_tasks() {
    let (source, store, mut board) = test_board().await;
    board.load().await;
    board.assign_deadline(&TaskId::from(1u64), date("2024-03-10")).await;
    board.assign_deadline(&TaskId::from(2u64), date("2024-03-11")).await;

    source.remove_task(&TaskId::from(2u64));
    assert!(board.refresh().await);
    assert_eq!(board.deadlines().deadline_for(&TaskId::from(2u64)).await, None);
    assert_eq!(store.raw_blob(DEADLINES_KEY).unwrap(), r#"{"2024-03-10":[1]}"#);
}

#[tokio::test]
async fn creating_and_completing_tasks() {
    let (source, _store, mut board) = test_board().await;
    board.load().await;

    assert_eq!(board.create_task("  ", "nothing").await, None);
    assert!(board.error().is_some());
    assert_eq!(source.tasks().len(), 2);
    board.dismiss_error();

    let created = board.create_task("Water plants", "").await.unwrap();
    assert_eq!(created.status(), TaskStatus::Pending);
    assert_eq!(board.tasks().len(), 3);

    assert!(board.set_completed(created.id(), true).await);
    assert!(board.task(created.id()).unwrap().completed());
    let remote = source.tasks().into_iter().find(|t| t.id() == created.id()).unwrap();
    assert!(remote.completed());
}

#[tokio::test]
async fn calendar_markers_use_the_theme_colors() {
    let (_source, store, mut board) = test_board().await;
    board.load().await;
    board.assign_deadline(&TaskId::from(1u64), date("2024-03-10")).await;
    board.assign_deadline(&TaskId::from(2u64), date("2024-03-11")).await;

    let theme = board.set_theme("sunset").await.clone();
    assert_eq!(store.raw_blob(THEME_KEY).as_deref(), Some("sunset"));

    let markers = board.calendar_markers().await;
    assert_eq!(markers[&date("2024-03-10")], theme.colors().primary);
    assert_eq!(markers[&date("2024-03-11")], theme.colors().secondary);

    // Completing the first task changes the color of its day
    board.set_completed(&TaskId::from(1u64), true).await;
    let markers = board.calendar_markers().await;
    assert_eq!(markers[&date("2024-03-10")], theme.colors().secondary);
}
