//! The external collaborators of this crate
use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;

use crate::task::{NewTask, Task, TaskChanges, TaskId};

/// A store that owns the tasks (usually a remote REST API).
///
/// The store knows nothing about deadlines: these are kept locally by a [`DeadlineIndex`](crate::deadlines::DeadlineIndex).
#[async_trait]
pub trait TaskSource {
    /// Returns every task this source contains
    async fn fetch_all_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>>;
    /// Creates a task. The source assigns its ID and sets its status to `Pending`
    async fn create_task(&self, new_task: &NewTask) -> Result<Task, Box<dyn Error>>;
    /// Apply a partial update to a task
    async fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> Result<(), Box<dyn Error>>;
    /// Delete a task
    async fn delete_task(&self, id: &TaskId) -> Result<(), Box<dyn Error>>;
}

/// A persistent store of named string blobs
#[async_trait]
pub trait KeyValueStore {
    /// Returns the blob for this key, or `None` in case it has never been set
    async fn get_blob(&self, key: &str) -> Result<Option<String>, Box<dyn Error>>;
    async fn set_blob(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>>;
    /// Removing a key that does not exist is not an error
    async fn remove_blob(&self, key: &str) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl<T> KeyValueStore for Arc<T>
where
    T: KeyValueStore + Send + Sync + ?Sized,
{
    async fn get_blob(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        (**self).get_blob(key).await
    }
    async fn set_blob(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        (**self).set_blob(key, value).await
    }
    async fn remove_blob(&self, key: &str) -> Result<(), Box<dyn Error>> {
        (**self).remove_blob(key).await
    }
}

#[async_trait]
impl<T> TaskSource for Arc<T>
where
    T: TaskSource + Send + Sync + ?Sized,
{
    async fn fetch_all_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>> {
        (**self).fetch_all_tasks().await
    }
    async fn create_task(&self, new_task: &NewTask) -> Result<Task, Box<dyn Error>> {
        (**self).create_task(new_task).await
    }
    async fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> Result<(), Box<dyn Error>> {
        (**self).update_task(id, changes).await
    }
    async fn delete_task(&self, id: &TaskId) -> Result<(), Box<dyn Error>> {
        (**self).delete_task(id).await
    }
}
