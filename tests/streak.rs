//! Streak transitions over several days

use std::sync::Arc;

use chrono::NaiveDate;

use deadline_board::mock_behaviour::MockBehaviour;
use deadline_board::store::MemoryStore;
use deadline_board::streak::{StreakTracker, STREAK_KEY};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn tracker() -> (Arc<MemoryStore>, StreakTracker<Arc<MemoryStore>>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = Arc::new(MemoryStore::new());
    (store.clone(), StreakTracker::new(store))
}

#[tokio::test]
async fn first_day_starts_a_streak() {
    let (store, tracker) = tracker();
    let streak = tracker.check(day(1)).await;
    assert_eq!(streak.count, 1);
    assert_eq!(streak.last_played, Some(day(1)));
    assert_eq!(store.raw_blob(STREAK_KEY).as_deref(), Some("1"));
}

#[tokio::test]
async fn checking_twice_a_day_changes_nothing() {
    let (_store, tracker) = tracker();
    tracker.check(day(1)).await;
    let streak = tracker.check(day(1)).await;
    assert_eq!(streak.count, 1);
    assert_eq!(tracker.current().await, streak);
}

#[tokio::test]
async fn consecutive_days_extend_the_streak() {
    let (_store, tracker) = tracker();
    tracker.check(day(1)).await;
    tracker.check(day(2)).await;
    let streak = tracker.check(day(3)).await;
    assert_eq!(streak.count, 3);
    assert_eq!(streak.last_played, Some(day(3)));
}

#[tokio::test]
async fn a_missed_day_resets_the_streak() {
    let (_store, tracker) = tracker();
    tracker.check(day(1)).await;
    tracker.check(day(2)).await;
    let streak = tracker.check(day(5)).await;
    assert_eq!(streak.count, 1);
    assert_eq!(streak.last_played, Some(day(5)));
}

#[tokio::test]
async fn completing_a_challenge() {
    let (_store, tracker) = tracker();
    tracker.check(day(1)).await;
    let streak = tracker.complete_challenge(day(1)).await;
    assert_eq!(streak.count, 2);
    assert_eq!(tracker.current().await.count, 2);
}

#[tokio::test]
async fn huge_stored_streaks_stop_growing() {
    let (store, tracker) = tracker();
    store.insert_raw_blob(STREAK_KEY, &u32::MAX.to_string());

    let streak = tracker.complete_challenge(day(1)).await;
    assert_eq!(streak.count, u32::MAX);
    let streak = tracker.check(day(2)).await;
    assert_eq!(streak.count, u32::MAX);
    assert_eq!(store.raw_blob(STREAK_KEY), Some(u32::MAX.to_string()));
}

#[tokio::test]
async fn storage_failures_are_not_fatal() {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = Arc::new(MemoryStore::with_behaviour(MockBehaviour::fail_now(5)));
    let tracker = StreakTracker::new(store.clone());

    let streak = tracker.check(day(1)).await;
    assert_eq!(streak.count, 1);
    assert_eq!(store.raw_blob(STREAK_KEY), None);
}
