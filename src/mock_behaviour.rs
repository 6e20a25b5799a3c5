//! This module provides ways to tweak mocked stores, so that they can return errors on some tests

use std::error::Error;

/// Describes how a mocked store or task source behaves during a test.
///
/// Each operation has a `(m, n)` counter: its first `m` calls succeed, the next `n` calls fail, and any later call succeeds.
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    // From the KeyValueStore trait
    pub get_blob_behaviour: (u32, u32),
    pub set_blob_behaviour: (u32, u32),

    // From the TaskSource trait
    pub fetch_all_tasks_behaviour: (u32, u32),
    pub create_task_behaviour: (u32, u32),
    pub update_task_behaviour: (u32, u32),
    pub delete_task_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails for its next `n_fails` calls
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            get_blob_behaviour: (0, n_fails),
            set_blob_behaviour: (0, n_fails),
            fetch_all_tasks_behaviour: (0, n_fails),
            create_task_behaviour: (0, n_fails),
            update_task_behaviour: (0, n_fails),
            delete_task_behaviour: (0, n_fails),
        }
    }

    pub fn can_get_blob(&mut self) -> Result<(), Box<dyn Error>> {
        consume(&mut self.get_blob_behaviour, "get_blob")
    }
    pub fn can_set_blob(&mut self) -> Result<(), Box<dyn Error>> {
        consume(&mut self.set_blob_behaviour, "set_blob")
    }
    pub fn can_fetch_all_tasks(&mut self) -> Result<(), Box<dyn Error>> {
        consume(&mut self.fetch_all_tasks_behaviour, "fetch_all_tasks")
    }
    pub fn can_create_task(&mut self) -> Result<(), Box<dyn Error>> {
        consume(&mut self.create_task_behaviour, "create_task")
    }
    pub fn can_update_task(&mut self) -> Result<(), Box<dyn Error>> {
        consume(&mut self.update_task_behaviour, "update_task")
    }
    pub fn can_delete_task(&mut self) -> Result<(), Box<dyn Error>> {
        consume(&mut self.delete_task_behaviour, "delete_task")
    }
}


/// Use up one call of a `(successes, failures)` counter
fn consume(counter: &mut (u32, u32), operation: &str) -> Result<(), Box<dyn Error>> {
    match *counter {
        (0, 0) => Ok(()),
        (0, failures) => {
            counter.1 = failures - 1;
            log::debug!("Mocked {} fails ({} failures left)", operation, counter.1);
            Err(format!("Mocked {} failure", operation).into())
        },
        (successes, _) => {
            counter.0 = successes - 1;
            Ok(())
        },
    }
}
