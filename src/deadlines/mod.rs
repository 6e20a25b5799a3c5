//! This module keeps track of task deadlines.
//!
//! The remote task store knows nothing about deadlines. They are kept locally, in a [`DeadlineMap`]
//! that is persisted into a [`KeyValueStore`] after every change.
//! A [`DeadlineIndex`] owns this map, and makes sure changes are applied (and persisted) one at a time.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use chrono::NaiveDate;
use csscolorparser::Color;
use tokio::sync::Mutex;

use crate::task::{TaskId, TaskStatus};
use crate::traits::KeyValueStore;

mod map;
pub use map::DeadlineMap;
pub use map::DATE_FORMAT;
mod marker;
pub use marker::{MarkerColors, MarkerPolicy};

/// The key of the persisted map in the key-value store
pub const DEADLINES_KEY: &str = "deadlines";

/// The default bound on a single store access
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(5);

/// A change made while the persisted map could not be read yet
#[derive(Clone, Debug)]
enum PendingChange {
    Assign(TaskId, NaiveDate),
    Clear(TaskId),
}

#[derive(Debug, Default)]
struct IndexState {
    map: DeadlineMap,
    /// Whether the persisted map has been read. Nothing is persisted before that
    loaded: bool,
    /// Changes to replay onto the persisted map once it can be read
    pending: Vec<PendingChange>,
    /// Whether the in-memory map differs from the persisted one
    unsaved: bool,
}

impl IndexState {
    /// Replace the map with the persisted one, and re-apply the changes made in the meantime
    fn set_persisted(&mut self, map: DeadlineMap) {
        self.map = map;
        for change in self.pending.drain(..) {
            match change {
                PendingChange::Assign(task_id, date) => self.map.assign(&task_id, date),
                PendingChange::Clear(task_id) => { self.map.remove(&task_id); },
            }
        }
        self.loaded = true;
    }
}

/// Owns the deadline map and keeps it in sync with its persisted copy.
///
/// Storage failures never reach the caller: they are logged, and the in-memory map keeps the change.
/// Changes are serialized: an `assign` or a `clear` does not start before the previous one has been persisted.
#[derive(Debug)]
pub struct DeadlineIndex<S: KeyValueStore> {
    store: S,
    state: Mutex<IndexState>,
    persist_timeout: Duration,
    policy: MarkerPolicy,
}

impl<S: KeyValueStore> DeadlineIndex<S> {
    /// Create an index that has not been loaded yet. Until [`Self::load`] is called, it behaves as an empty index
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: Mutex::new(IndexState::default()),
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
            policy: MarkerPolicy::default(),
        }
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }

    pub fn with_marker_policy(mut self, policy: MarkerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn marker_policy(&self) -> MarkerPolicy {
        self.policy
    }

    /// (Re)load the map from the store. Missing or invalid data gives an empty map.
    ///
    /// In case the store cannot be read, the in-memory map is kept, and the read is retried on the next change
    pub async fn load(&self) -> DeadlineMap {
        let mut state = self.state.lock().await;
        if let Some(map) = self.read_persisted().await {
            let had_pending = state.pending.is_empty() == false;
            state.set_persisted(map);
            state.unsaved = false;
            log::debug!("Loaded deadlines for {} tasks", state.map.task_count());
            if had_pending {
                self.persist(&mut state).await;
            }
        }
        state.map.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.lock().await.loaded
    }

    /// Set the deadline of a task. Any previous deadline of this task is removed
    pub async fn assign(&self, task_id: &TaskId, date: NaiveDate) -> DeadlineMap {
        let mut state = self.lock_loaded().await;
        state.map.assign(task_id, date);
        log::debug!("Task {} is now due on {}", task_id, date);
        if state.loaded {
            self.persist(&mut state).await;
        } else {
            state.pending.push(PendingChange::Assign(task_id.clone(), date));
        }
        state.map.clone()
    }

    /// Remove the deadline of a task. This is a no-op in case the task had no deadline
    pub async fn clear(&self, task_id: &TaskId) -> DeadlineMap {
        let mut state = self.lock_loaded().await;
        match state.map.remove(task_id) {
            Some(date) => log::debug!("Task {} is no longer due on {}", task_id, date),
            None => log::trace!("Task {} had no deadline", task_id),
        }
        if state.loaded {
            self.persist(&mut state).await;
        } else {
            state.pending.push(PendingChange::Clear(task_id.clone()));
        }
        state.map.clone()
    }

    /// Forget the deadlines of every task for which `keep` returns false (e.g. tasks that have been deleted remotely).
    ///
    /// This is a no-op as long as the persisted deadlines cannot be read
    pub async fn retain<F>(&self, keep: F) -> DeadlineMap
    where
        F: FnMut(&TaskId) -> bool,
    {
        let mut state = self.lock_loaded().await;
        if state.loaded == false {
            return state.map.clone();
        }
        let n_removed = state.map.retain(keep);
        if n_removed > 0 {
            log::info!("Forgetting the deadlines of {} unknown tasks", n_removed);
            self.persist(&mut state).await;
        }
        state.map.clone()
    }

    /// Delete every deadline, including the persisted ones
    pub async fn reset(&self) -> DeadlineMap {
        let mut state = self.state.lock().await;
        state.map = DeadlineMap::new();
        state.pending.clear();
        state.loaded = true;
        state.unsaved = match tokio::time::timeout(self.persist_timeout, self.store.remove_blob(DEADLINES_KEY)).await {
            Ok(Ok(())) => { log::info!("Deleted every deadline"); false },
            Ok(Err(err)) => { log::warn!("Unable to delete the persisted deadlines: {}", err); true },
            Err(_) => { log::warn!("Timeout while deleting the persisted deadlines"); true },
        };
        state.map.clone()
    }

    /// Whether the last change (or a change that was made before the persisted map could be read) has not been persisted
    pub async fn has_unsaved_changes(&self) -> bool {
        let state = self.state.lock().await;
        state.unsaved || state.pending.is_empty() == false
    }

    /// A copy of the current map
    pub async fn snapshot(&self) -> DeadlineMap {
        self.state.lock().await.map.clone()
    }

    pub async fn deadline_for(&self, task_id: &TaskId) -> Option<NaiveDate> {
        self.state.lock().await.map.deadline_for(task_id)
    }

    pub async fn tasks_for(&self, date: NaiveDate) -> BTreeSet<TaskId> {
        self.state.lock().await.map.tasks_for(date)
    }

    /// The marker color of `date`, according to the marker policy of this index
    pub async fn marker_color(&self, date: NaiveDate, statuses: &HashMap<TaskId, TaskStatus>, colors: &MarkerColors) -> Color {
        let state = self.state.lock().await;
        colors.marker_color(self.policy, &state.map, date, statuses)
    }

    /// The marker color of every date that has deadlines
    pub async fn markers(&self, statuses: &HashMap<TaskId, TaskStatus>, colors: &MarkerColors) -> BTreeMap<NaiveDate, Color> {
        let state = self.state.lock().await;
        colors.markers(self.policy, &state.map, statuses)
    }


    /// Lock the state for a change.
    /// A change must not be persisted before the stored map has been read, otherwise it would overwrite the stored deadlines.
    /// In case it still cannot be read, the returned state is not `loaded`
    async fn lock_loaded(&self) -> tokio::sync::MutexGuard<'_, IndexState> {
        let mut state = self.state.lock().await;
        if state.loaded == false {
            log::debug!("Deadlines have not been loaded yet, loading them before this change");
            match self.read_persisted().await {
                Some(map) => state.set_persisted(map),
                None => log::warn!("Keeping this change in memory until the stored deadlines can be read"),
            }
        }
        state
    }

    /// The persisted map, or `None` in case the store could not be read.
    /// Missing or invalid data is read as an empty map
    async fn read_persisted(&self) -> Option<DeadlineMap> {
        let blob = match tokio::time::timeout(self.persist_timeout, self.store.get_blob(DEADLINES_KEY)).await {
            Ok(Ok(blob)) => blob,
            Ok(Err(err)) => {
                log::warn!("Unable to read the persisted deadlines: {}", err);
                return None;
            },
            Err(_) => {
                log::warn!("Timeout while reading the persisted deadlines");
                return None;
            },
        };

        match blob {
            None => Some(DeadlineMap::new()),
            Some(json) => Some(DeadlineMap::from_json(&json).unwrap_or_else(|err| {
                log::warn!("Invalid persisted deadlines ({}). Starting with no deadlines", err);
                DeadlineMap::new()
            })),
        }
    }

    async fn persist(&self, state: &mut IndexState) {
        let json = match state.map.to_json() {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Unable to serialize deadlines: {}", err);
                state.unsaved = true;
                return;
            },
        };

        state.unsaved = match tokio::time::timeout(self.persist_timeout, self.store.set_blob(DEADLINES_KEY, &json)).await {
            Ok(Ok(())) => false,
            Ok(Err(err)) => {
                log::warn!("Unable to save deadlines: {}", err);
                true
            },
            Err(_) => {
                log::warn!("Timeout while saving deadlines");
                true
            },
        };
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::mock_behaviour::MockBehaviour;
    use crate::store::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[tokio::test]
    async fn queries_before_load_see_an_empty_index() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw_blob(DEADLINES_KEY, r#"{"2024-03-10":[5]}"#);
        let index = DeadlineIndex::new(store.clone());

        assert_eq!(index.is_loaded().await, false);
        assert_eq!(index.deadline_for(&TaskId::from(5u64)).await, None);
        assert!(index.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn changes_before_load_keep_stored_deadlines() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw_blob(DEADLINES_KEY, r#"{"2024-03-10":[5]}"#);
        let index = DeadlineIndex::new(store.clone());

        index.assign(&TaskId::from(6u64), date("2024-03-12")).await;
        assert_eq!(store.raw_blob(DEADLINES_KEY).unwrap(), r#"{"2024-03-10":[5],"2024-03-12":[6]}"#);
        assert!(index.is_loaded().await);
    }

    #[tokio::test]
    async fn failed_reads_give_an_empty_map() {
        let store = Arc::new(MemoryStore::with_behaviour(MockBehaviour { get_blob_behaviour: (0, 1), ..MockBehaviour::default() }));
        store.insert_raw_blob(DEADLINES_KEY, r#"{"2024-03-10":[5]}"#);
        let index = DeadlineIndex::new(store.clone());
        assert!(index.load().await.is_empty());
        // The next read succeeds
        assert_eq!(index.load().await.task_count(), 1);
    }

    #[tokio::test]
    async fn failed_reads_do_not_overwrite_stored_deadlines() {
        let store = Arc::new(MemoryStore::with_behaviour(MockBehaviour { get_blob_behaviour: (0, 1), ..MockBehaviour::default() }));
        store.insert_raw_blob(DEADLINES_KEY, r#"{"2024-03-10":[5,6,7]}"#);
        let index = DeadlineIndex::new(store.clone());

        // The store cannot be read: the change is only kept in memory
        let map = index.assign(&TaskId::from(8u64), date("2024-03-12")).await;
        assert_eq!(map.to_json().unwrap(), r#"{"2024-03-12":[8]}"#);
        assert_eq!(store.raw_blob(DEADLINES_KEY).unwrap(), r#"{"2024-03-10":[5,6,7]}"#);
        assert_eq!(index.is_loaded().await, false);
        assert!(index.has_unsaved_changes().await);

        // The next change reads the store again, and replays the previous change
        index.clear(&TaskId::from(6u64)).await;
        assert!(index.is_loaded().await);
        assert_eq!(index.has_unsaved_changes().await, false);
        assert_eq!(store.raw_blob(DEADLINES_KEY).unwrap(), r#"{"2024-03-10":[5,7],"2024-03-12":[8]}"#);
    }

    #[tokio::test]
    async fn a_later_load_replays_changes_made_while_the_store_was_unreadable() {
        let store = Arc::new(MemoryStore::with_behaviour(MockBehaviour { get_blob_behaviour: (0, 2), ..MockBehaviour::default() }));
        store.insert_raw_blob(DEADLINES_KEY, r#"{"2024-03-10":[5]}"#);
        let index = DeadlineIndex::new(store.clone());

        assert!(index.load().await.is_empty());
        index.clear(&TaskId::from(5u64)).await;
        assert_eq!(store.raw_blob(DEADLINES_KEY).unwrap(), r#"{"2024-03-10":[5]}"#);

        assert!(index.load().await.is_empty());
        assert_eq!(store.raw_blob(DEADLINES_KEY).unwrap(), "{}");
        assert_eq!(index.has_unsaved_changes().await, false);
    }

    #[tokio::test]
    async fn reset_deletes_the_blob() {
        let store = Arc::new(MemoryStore::new());
        let index = DeadlineIndex::new(store.clone());
        index.load().await;
        index.assign(&TaskId::from(1u64), date("2024-01-01")).await;
        assert!(store.raw_blob(DEADLINES_KEY).is_some());

        assert!(index.reset().await.is_empty());
        assert_eq!(store.raw_blob(DEADLINES_KEY), None);
        assert!(index.load().await.is_empty());
    }

    #[tokio::test]
    async fn retain_only_persists_actual_changes() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw_blob(DEADLINES_KEY, r#"{"2024-03-10":[5, 6]}"#);
        let index = DeadlineIndex::new(store.clone());
        index.load().await;

        // Any write would fail from now on
        store.set_behaviour(MockBehaviour { set_blob_behaviour: (0, 10), ..MockBehaviour::default() });
        let map = index.retain(|_| true).await;
        assert_eq!(map.task_count(), 2);

        store.set_behaviour(MockBehaviour::new());
        let map = index.retain(|id| id == &TaskId::from(6u64)).await;
        assert_eq!(map.to_json().unwrap(), r#"{"2024-03-10":[6]}"#);
        assert_eq!(store.raw_blob(DEADLINES_KEY).unwrap(), r#"{"2024-03-10":[6]}"#);
    }
}
