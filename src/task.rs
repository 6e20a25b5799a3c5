//! To-do tasks, as they are returned by the remote task API

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::de::{self, Visitor};

/// The identifier of a task, as assigned by the remote task store.
///
/// Stores may use integer or string identifiers. Integer-looking identifiers are always
/// kept as [`TaskId::Number`], so that `5` and `"5"` designate the same task.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    Number(u64),
    Text(String),
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Number(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        match s.parse::<u64>() {
            // "007" is not the same identifier as 7
            Ok(n) if n.to_string() == s => TaskId::Number(n),
            _ => TaskId::Text(s.to_string()),
        }
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId::from(s.as_str())
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TaskId::from(s))
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Used to support serde
impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TaskId::Number(n) => serializer.serialize_u64(*n),
            TaskId::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct TaskIdVisitor;

impl<'de> Visitor<'de> for TaskIdVisitor {
    type Value = TaskId;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "a non-negative integer or a string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TaskId, E> {
        Ok(TaskId::Number(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TaskId, E> {
        if v < 0 {
            return Err(E::custom(format!("negative task id {}", v)));
        }
        Ok(TaskId::Number(v as u64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TaskId, E> {
        Ok(TaskId::from(v))
    }
}

/// Used to support serde
impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<TaskId, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TaskIdVisitor)
    }
}



/// Whether a task has been done.
///
/// Task stores are not consistent about the casing of this field (`"Completed"`, `"completed"`...).
/// This is normalized here: any casing is accepted when reading, and the canonical
/// `"Pending"`/`"Completed"` forms are always written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            TaskStatus::Completed => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Parse a status string from a task store. Unknown values are read as `Pending`
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "done" => TaskStatus::Completed,
            "pending" => TaskStatus::Pending,
            other => {
                log::warn!("Unknown task status {:?}, considering it as pending", other);
                TaskStatus::Pending
            }
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Used to support serde
impl Serialize for TaskStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Used to support serde
impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<TaskStatus, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TaskStatus::normalize(&raw))
    }
}



/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the task store
    id: TaskId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    status: TaskStatus,
    /// Opaque creation timestamp, as formatted by the task store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

impl Task {
    pub fn new(id: TaskId, title: String, description: String, status: TaskStatus, created_at: Option<String>) -> Self {
        Self { id, title, description, status, created_at }
    }

    pub fn id(&self) -> &TaskId          { &self.id          }
    pub fn title(&self) -> &str          { &self.title       }
    pub fn description(&self) -> &str    { &self.description }
    pub fn status(&self) -> TaskStatus   { self.status       }
    pub fn completed(&self) -> bool      { self.status.is_completed() }
    pub fn created_at(&self) -> Option<&str> { self.created_at.as_deref() }

    /// Apply the changes that have been accepted by the task store
    pub fn apply(&mut self, changes: &TaskChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
    }
}

/// The body of a task creation request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl NewTask {
    pub fn new<T: ToString, D: ToString>(title: T, description: D) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            status: TaskStatus::Pending,
        }
    }
}

/// A partial update of a task. Fields that are `None` are left untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    pub fn status(status: TaskStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_from_numbers_and_strings_match() {
        assert_eq!(TaskId::from(5u64), TaskId::from("5"));
        assert_eq!(TaskId::from("007"), TaskId::Text("007".to_string()));
        assert_eq!(TaskId::from("abc"), TaskId::Text("abc".to_string()));

        let ids: Vec<TaskId> = serde_json::from_str(r#"[5, "6", "x-1"]"#).unwrap();
        assert_eq!(ids, vec![TaskId::from(5u64), TaskId::from(6u64), TaskId::from("x-1")]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[5,6,"x-1"]"#);

        assert!(serde_json::from_str::<TaskId>("-3").is_err());
    }

    #[test]
    fn status_casing_is_normalized() {
        for raw in &["\"Completed\"", "\"completed\"", "\"COMPLETED\""] {
            let status: TaskStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(status, TaskStatus::Completed);
        }
        let status: TaskStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, TaskStatus::Pending);
        let status: TaskStatus = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(status, TaskStatus::Pending);

        assert_eq!(serde_json::to_string(&TaskStatus::Completed).unwrap(), "\"Completed\"");
    }

    #[test]
    fn task_from_api_json() {
        let json = r#"{"id": 12, "title": "Buy milk", "description": "2 L", "status": "completed", "created_at": "2024-03-01T10:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id(), &TaskId::Number(12));
        assert!(task.completed());
        assert_eq!(task.created_at(), Some("2024-03-01T10:00:00Z"));

        let minimal: Task = serde_json::from_str(r#"{"id": "a", "title": "t"}"#).unwrap();
        assert_eq!(minimal.status(), TaskStatus::Pending);
        assert_eq!(minimal.description(), "");
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let mut task = Task::new(TaskId::from(1u64), "a".into(), "b".into(), TaskStatus::Pending, None);
        task.apply(&TaskChanges::status(TaskStatus::Completed));
        assert_eq!(task.title(), "a");
        assert!(task.completed());

        let body = serde_json::to_string(&TaskChanges::status(TaskStatus::Completed)).unwrap();
        assert_eq!(body, r#"{"status":"Completed"}"#);
    }
}
