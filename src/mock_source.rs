//! An in-memory task store, that mimics the remote task API.
//!
//! This is used by tests and demos. Its behaviour can be tweaked to simulate network failures.

use std::error::Error;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::mock_behaviour::MockBehaviour;
use crate::task::{NewTask, Task, TaskChanges, TaskId, TaskStatus};
use crate::traits::TaskSource;

#[derive(Debug, Default)]
struct MockData {
    tasks: Vec<Task>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct MockTaskSource {
    data: Mutex<MockData>,
    mock_behaviour: Mutex<MockBehaviour>,
}

impl MockTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            data: Mutex::new(MockData::default()),
            mock_behaviour: Mutex::new(behaviour),
        }
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *self.mock_behaviour.lock().unwrap() = behaviour;
    }

    /// Add a task "from another device", bypassing the mock behaviour
    pub fn insert_task(&self, task: Task) {
        self.data.lock().unwrap().tasks.push(task);
    }

    /// Remove a task "from another device", bypassing the mock behaviour
    pub fn remove_task(&self, id: &TaskId) {
        self.data.lock().unwrap().tasks.retain(|t| t.id() != id);
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.data.lock().unwrap().tasks.clone()
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn fetch_all_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>> {
        self.mock_behaviour.lock().unwrap().can_fetch_all_tasks()?;
        Ok(self.tasks())
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, Box<dyn Error>> {
        self.mock_behaviour.lock().unwrap().can_create_task()?;
        let mut data = self.data.lock().unwrap();
        data.next_id += 1;
        let task = Task::new(
            TaskId::from(data.next_id),
            new_task.title.clone(),
            new_task.description.clone(),
            TaskStatus::Pending,
            Some(chrono::Utc::now().to_rfc3339()),
        );
        data.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> Result<(), Box<dyn Error>> {
        self.mock_behaviour.lock().unwrap().can_update_task()?;
        let mut data = self.data.lock().unwrap();
        match data.tasks.iter_mut().find(|t| t.id() == id) {
            None => Err(format!("No task {}", id).into()),
            Some(task) => {
                task.apply(changes);
                Ok(())
            },
        }
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), Box<dyn Error>> {
        self.mock_behaviour.lock().unwrap().can_delete_task()?;
        let mut data = self.data.lock().unwrap();
        let before = data.tasks.len();
        data.tasks.retain(|t| t.id() != id);
        if data.tasks.len() == before {
            return Err(format!("No task {}", id).into());
        }
        Ok(())
    }
}
