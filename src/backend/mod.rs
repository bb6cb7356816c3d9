//! Task backend abstraction.
//!
//! This module defines the interface every task store implements (the hosted
//! REST API or the local SQLite store), along with the task model shared by the
//! rest of the application and the error type for backend operations.

use crate::utils::datetime;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub mod factory;
pub mod local;
pub mod rest;

pub use factory::create_backend;
pub use local::LocalBackend;
pub use rest::RestBackend;

/// Common error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 401 or 403; displays only the per-operation message
    #[error("{0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status; `message` is what the user should see
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Backend error: {0}")]
    Other(String),
}

/// Where a task sits in its lifecycle.
///
/// Encoded on the wire as `PENDING`, `IN_PROGRESS` and `COMPLETED`. Decoding is
/// lenient and accepts the other spellings older records use (`in-progress`,
/// `In Progress`, `inProcess`, lowercase forms).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    /// Value used in query parameters and JSON bodies
    pub fn as_wire(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Next status in selector order, wrapping around
    pub fn cycle(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" | "inprocess" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(BackendError::InvalidData(format!("unknown task status '{}'", s))),
        }
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A task record as returned by a backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "datetime::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "datetime::optional_date")]
    pub end_date: Option<NaiveDate>,
    pub status: TaskStatus,
}

impl Task {
    /// Copy of this task with the editable fields taken from `draft`
    pub fn with_draft(&self, draft: &TaskDraft) -> Task {
        Task {
            id: self.id.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: draft.status,
        }
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
        }
    }
}

/// The user-editable part of a task, as submitted by the task form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    #[serde(default, with = "datetime::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "datetime::optional_date")]
    pub end_date: Option<NaiveDate>,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            start_date: None,
            end_date: None,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
}

/// Identity of the signed-in user, passed with every backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    /// Identity token for `Authorization: Bearer`, when the provider issued one
    pub id_token: Option<String>,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            id_token: None,
        }
    }
}

/// Backend trait that all task stores must implement.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Returns the backend type identifier ("rest" or "local").
    fn backend_type(&self) -> &str;

    /// Every task of `user` with the given status
    async fn fetch_tasks(&self, user: &UserContext, status: TaskStatus) -> Result<Vec<Task>, BackendError>;

    /// Create a task and return the stored record (with its assigned id)
    async fn create_task(&self, user: &UserContext, draft: &TaskDraft) -> Result<Task, BackendError>;

    /// Replace the stored record with `task` and return what the store now holds
    async fn update_task(&self, user: &UserContext, task: &Task) -> Result<Task, BackendError>;

    async fn delete_task(&self, user: &UserContext, task_id: &str) -> Result<(), BackendError>;
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(text) => Ok(text),
        RawId::Number(number) => Ok(number.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_legacy_spellings() {
        for raw in ["pending", "Pending", "PENDING"] {
            assert_eq!(raw.parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        }
        for raw in ["in-progress", "In Progress", "inProcess", "IN_PROGRESS"] {
            assert_eq!(raw.parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        }
        for raw in ["completed", "Completed", "COMPLETED"] {
            assert_eq!(raw.parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        }
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_decodes_numeric_id_and_empty_dates() {
        let json = r#"{"id": 1700000000000, "title": "Write report", "description": "Q3",
                       "startDate": "", "endDate": "2024-06-01", "status": "In Progress", "userId": "a@b.co"}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.id, "1700000000000");
        assert_eq!(task.start_date, None);
        assert_eq!(task.end_date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn task_encodes_wire_status() {
        let task = Task {
            id: "7".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            start_date: None,
            end_date: None,
            status: TaskStatus::Completed,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["status"], "COMPLETED");
        assert_eq!(value["startDate"], "");
    }
}
