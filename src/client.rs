//! This module provides a client to connect to a todo REST API

use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use url::Url;

use crate::config::Settings;
use crate::task::{NewTask, Task, TaskChanges, TaskId};
use crate::traits::TaskSource;

/// The path of the task collection, relative to the API base URL
const TASKS_PATH: &str = "todos";

/// A [`TaskSource`] that fetches its data from a todo REST API
pub struct Client {
    base_url: Url,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S, api_key: Option<String>, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(format!("{} cannot be used as a base URL", base_url).into());
        }
        // So that joining "todos" appends to the path instead of replacing its last segment
        if base_url.path().ends_with('/') == false {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { base_url, api_key, http })
    }

    /// Create a client from the runtime settings
    pub fn from_settings(settings: &Settings) -> Result<Self, Box<dyn Error>> {
        let url = settings.require_api_url()?;
        Self::new(url.as_str(), settings.api_key.clone(), settings.http_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The URL of the task collection
    pub fn tasks_url(&self) -> Result<Url, Box<dyn Error>> {
        Ok(self.base_url.join(TASKS_PATH)?)
    }

    /// The URL of a single task
    pub fn task_url(&self, id: &TaskId) -> Result<Url, Box<dyn Error>> {
        let mut url = self.tasks_url()?;
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be used as a base URL", self.base_url))?
            .push(&id.to_string());
        Ok(url)
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(USER_AGENT, crate::config::user_agent());
        match &self.api_key {
            None => request,
            Some(key) => request.header(AUTHORIZATION, format!("Bearer {}", key)),
        }
    }

    async fn send(&self, request: RequestBuilder, descr: &str) -> Result<Response, Box<dyn Error>> {
        let response = self.decorate(request).send().await?;
        if response.status().is_success() == false {
            return Err(format!("Unable to {}: unexpected HTTP status code {:?}", descr, response.status()).into());
        }
        Ok(response)
    }
}

#[async_trait]
impl TaskSource for Client {
    async fn fetch_all_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>> {
        let url = self.tasks_url()?;
        let response = self.send(self.http.get(url), "fetch tasks").await?;
        let text = response.text().await?;

        let tasks: Vec<Task> = serde_json::from_str(&text)
            .map_err(|err| format!("Invalid task list: {}", err))?;
        log::debug!("Fetched {} tasks", tasks.len());
        Ok(tasks)
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, Box<dyn Error>> {
        let url = self.tasks_url()?;
        let body = serde_json::to_string(new_task)?;
        let request = self.http.post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response = self.send(request, "create a task").await?;
        let text = response.text().await?;

        let task: Task = serde_json::from_str(&text)
            .map_err(|err| format!("Invalid created task: {}", err))?;
        log::info!("Created task {} ({})", task.id(), task.title());
        Ok(task)
    }

    async fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> Result<(), Box<dyn Error>> {
        if changes.is_empty() {
            log::debug!("Nothing to update for task {}", id);
            return Ok(());
        }
        let url = self.task_url(id)?;
        let body = serde_json::to_string(changes)?;
        let request = self.http.put(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(request, "update a task").await?;
        log::debug!("Updated task {}", id);
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), Box<dyn Error>> {
        let url = self.task_url(id)?;
        self.send(self.http.delete(url), "delete a task").await?;
        log::info!("Deleted task {}", id);
        Ok(())
    }
}
