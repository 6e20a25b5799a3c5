//! This module combines the remote task list with the local deadlines
//!
//! A [`Board`] is what a user interface talks to: it forwards task changes to the [`TaskSource`],
//! keeps the [`DeadlineIndex`] consistent with them, and turns remote errors into messages that can be displayed.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use csscolorparser::Color;

use crate::config::Settings;
use crate::deadlines::{DeadlineIndex, DeadlineMap, MarkerColors, MarkerPolicy, DEFAULT_PERSIST_TIMEOUT};
use crate::task::{NewTask, Task, TaskChanges, TaskId, TaskStatus};
use crate::theme::{self, ThemeAction, ThemeState};
use crate::traits::{KeyValueStore, TaskSource};

pub struct Board<R, S>
where
    R: TaskSource,
    S: KeyValueStore + Clone,
{
    /// The task store (usually a remote API)
    source: R,
    /// The local store, for the theme
    store: S,
    deadlines: DeadlineIndex<S>,

    tasks: Vec<Task>,
    theme: ThemeState,
    /// The last error, as it should be displayed
    error: Option<String>,
}

impl<R, S> Board<R, S>
where
    R: TaskSource,
    S: KeyValueStore + Clone,
{
    /// Create a board. Nothing is loaded until [`Self::load`] is called
    pub fn new(source: R, store: S) -> Self {
        Self::with_options(source, store, DEFAULT_PERSIST_TIMEOUT, MarkerPolicy::default())
    }

    pub fn from_settings(source: R, store: S, settings: &Settings) -> Self {
        Self::with_options(source, store, settings.persist_timeout, settings.marker_policy)
    }

    pub fn with_options(source: R, store: S, persist_timeout: std::time::Duration, policy: MarkerPolicy) -> Self {
        let deadlines = DeadlineIndex::new(store.clone())
            .with_persist_timeout(persist_timeout)
            .with_marker_policy(policy);
        Self {
            source, store, deadlines,
            tasks: Vec::new(),
            theme: ThemeState::default(),
            error: None,
        }
    }

    /// Load the local data, then fetch the tasks.
    ///
    /// Returns whether the tasks could be fetched. Local data is always loaded (possibly with default values)
    pub async fn load(&mut self) -> bool {
        self.deadlines.load().await;
        self.theme = theme::load_theme(&self.store).await;
        self.refresh().await
    }

    pub fn source(&self) -> &R { &self.source }
    pub fn deadlines(&self) -> &DeadlineIndex<S> { &self.deadlines }
    pub fn tasks(&self) -> &[Task] { &self.tasks }
    pub fn theme(&self) -> &ThemeState { &self.theme }
    /// The last error that happened, if it has not been dismissed yet
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Fetch the tasks again. Deadlines of tasks that no longer exist are forgotten.
    ///
    /// In case of an error, the previous task list is kept.
    pub async fn refresh(&mut self) -> bool {
        let tasks = match self.source.fetch_all_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                self.report(format!("Unable to fetch tasks: {}", err));
                return false;
            },
        };

        self.tasks = tasks;
        self.error = None;
        let known: HashSet<TaskId> = self.tasks.iter().map(|t| t.id().clone()).collect();
        self.deadlines.retain(|id| known.contains(id)).await;
        true
    }

    /// Create a task. Returns it in case it has been created
    pub async fn create_task(&mut self, title: &str, description: &str) -> Option<Task> {
        if title.trim().is_empty() {
            self.report("A task needs a title".to_string());
            return None;
        }

        let new_task = NewTask::new(title.trim(), description.trim());
        let task = match self.source.create_task(&new_task).await {
            Ok(task) => task,
            Err(err) => {
                self.report(format!("Unable to create task: {}", err));
                return None;
            },
        };
        self.tasks.push(task.clone());
        Some(task)
    }

    /// Mark a task as completed (or not)
    pub async fn set_completed(&mut self, id: &TaskId, completed: bool) -> bool {
        let status = if completed { TaskStatus::Completed } else { TaskStatus::Pending };
        let changes = TaskChanges::status(status);
        if let Err(err) = self.source.update_task(id, &changes).await {
            self.report(format!("Unable to update task {}: {}", id, err));
            return false;
        }
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id() == id) {
            task.apply(&changes);
        }
        true
    }

    /// Delete a task, and its deadline
    pub async fn delete_task(&mut self, id: &TaskId) -> bool {
        if let Err(err) = self.source.delete_task(id).await {
            self.report(format!("Unable to delete task {}: {}", id, err));
            return false;
        }
        self.tasks.retain(|t| t.id() != id);
        self.deadlines.clear(id).await;
        true
    }

    pub async fn assign_deadline(&self, id: &TaskId, date: NaiveDate) -> DeadlineMap {
        self.deadlines.assign(id, date).await
    }

    pub async fn clear_deadline(&self, id: &TaskId) -> DeadlineMap {
        self.deadlines.clear(id).await
    }

    /// The known tasks that are due on `date`
    pub async fn tasks_due(&self, date: NaiveDate) -> Vec<Task> {
        let ids = self.deadlines.tasks_for(date).await;
        self.tasks.iter()
            .filter(|t| ids.contains(t.id()))
            .cloned()
            .collect()
    }

    /// The latest known status of every task
    pub fn statuses(&self) -> HashMap<TaskId, TaskStatus> {
        self.tasks.iter()
            .map(|t| (t.id().clone(), t.status()))
            .collect()
    }

    /// The markers to display on a calendar, with the colors of the current theme
    pub async fn calendar_markers(&self) -> BTreeMap<NaiveDate, Color> {
        let colors = MarkerColors::from_theme(self.theme.colors());
        self.deadlines.markers(&self.statuses(), &colors).await
    }

    /// Change the theme, and remember it
    pub async fn set_theme(&mut self, name: &str) -> &ThemeState {
        self.theme = self.theme.apply(ThemeAction::SetTheme(name.to_string()));
        theme::save_theme(&self.store, &self.theme).await;
        &self.theme
    }

    fn report(&mut self, message: String) {
        log::warn!("{}", message);
        self.error = Some(message);
    }
}
