//! The date → task ids index

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::task::TaskId;

/// The format of the date keys, as persisted
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maps calendar dates to the tasks that are due on that day.
///
/// A task appears under at most one date, and dates with no tasks are never kept.
/// Every mutating method of this struct preserves these two invariants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeadlineMap {
    buckets: BTreeMap<NaiveDate, BTreeSet<TaskId>>,
}

impl DeadlineMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline of a task, removing any previous deadline it had
    pub fn assign(&mut self, task_id: &TaskId, date: NaiveDate) {
        self.remove(task_id);
        self.buckets.entry(date).or_insert_with(BTreeSet::new).insert(task_id.clone());
    }

    /// Remove the deadline of a task. Returns the date it was due, if any
    pub fn remove(&mut self, task_id: &TaskId) -> Option<NaiveDate> {
        let date = self.deadline_for(task_id)?;
        if let Some(bucket) = self.buckets.get_mut(&date) {
            bucket.remove(task_id);
            if bucket.is_empty() {
                self.buckets.remove(&date);
            }
        }
        Some(date)
    }

    /// Drop every task for which `keep` returns false. Returns how many tasks were dropped
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&TaskId) -> bool,
    {
        let mut n_removed = 0;
        for bucket in self.buckets.values_mut() {
            let before = bucket.len();
            bucket.retain(|id| keep(id));
            n_removed += before - bucket.len();
        }
        self.buckets.retain(|_, bucket| bucket.is_empty() == false);
        n_removed
    }

    pub fn deadline_for(&self, task_id: &TaskId) -> Option<NaiveDate> {
        self.buckets.iter()
            .find(|(_, bucket)| bucket.contains(task_id))
            .map(|(date, _)| *date)
    }

    /// The tasks due on `date`. This is empty if there are none
    pub fn tasks_for(&self, date: NaiveDate) -> BTreeSet<TaskId> {
        self.buckets.get(&date).cloned().unwrap_or_default()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &BTreeSet<TaskId>)> {
        self.buckets.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The number of tasks that have a deadline
    pub fn task_count(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.len()).sum()
    }

    /// Parse a persisted map.
    ///
    /// Persisted data that does not respect the invariants is repaired: empty lists are dropped,
    /// and a task listed under several dates is only kept under the earliest one.
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let map: Self = serde_json::from_str(json)?;
        Ok(map)
    }

    pub fn to_json(&self) -> Result<String, Box<dyn Error>> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Used to support serde
impl Serialize for DeadlineMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let raw: BTreeMap<String, &BTreeSet<TaskId>> = self.buckets.iter()
            .map(|(date, bucket)| (date.format(DATE_FORMAT).to_string(), bucket))
            .collect();
        raw.serialize(serializer)
    }
}

/// Used to support serde
impl<'de> Deserialize<'de> for DeadlineMap {
    fn deserialize<D>(deserializer: D) -> Result<DeadlineMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Vec<TaskId>>::deserialize(deserializer)?;

        let mut dated = Vec::with_capacity(raw.len());
        for (key, ids) in raw {
            let date = NaiveDate::parse_from_str(&key, DATE_FORMAT)
                .map_err(|err| serde::de::Error::custom(format!("invalid date {:?}: {}", key, err)))?;
            dated.push((date, ids));
        }
        dated.sort_by_key(|(date, _)| *date);

        let mut map = DeadlineMap::new();
        for (date, ids) in dated {
            for id in ids {
                if let Some(previous) = map.deadline_for(&id) {
                    log::warn!("Task {} is due both on {} and {}. Keeping {}", id, previous, date, previous);
                    continue;
                }
                map.buckets.entry(date).or_insert_with(BTreeSet::new).insert(id);
            }
        }
        Ok(map)
    }
}
