//! Local backend: tasks stored in SQLite on this machine.

use async_trait::async_trait;
use log::info;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{BackendError, Task, TaskBackend, TaskDraft, TaskStatus, UserContext};
use crate::storage::LocalStorage;

/// Task store backed by the local SeaORM database.
///
/// Ids are client timestamps in milliseconds, bumped when two tasks are
/// created within the same millisecond.
pub struct LocalBackend {
    storage: Arc<Mutex<LocalStorage>>,
    last_id: AtomicI64,
}

impl LocalBackend {
    pub fn new(storage: Arc<Mutex<LocalStorage>>) -> Self {
        Self {
            storage,
            last_id: AtomicI64::new(0),
        }
    }

    fn next_id(&self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or(now);
        now.max(previous + 1).to_string()
    }
}

fn storage_error(e: anyhow::Error) -> BackendError {
    BackendError::Other(format!("{:#}", e))
}

#[async_trait]
impl TaskBackend for LocalBackend {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn fetch_tasks(&self, user: &UserContext, status: TaskStatus) -> Result<Vec<Task>, BackendError> {
        let storage = self.storage.lock().await;
        storage
            .load_tasks_with_status(&user.user_id, status)
            .await
            .map_err(storage_error)
    }

    async fn create_task(&self, user: &UserContext, draft: &TaskDraft) -> Result<Task, BackendError> {
        let task = Task {
            id: self.next_id(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: draft.status,
        };

        let storage = self.storage.lock().await;
        storage.store_task(&user.user_id, &task).await.map_err(storage_error)?;
        info!("💾 Stored local task {}", task.id);
        Ok(task)
    }

    async fn update_task(&self, user: &UserContext, task: &Task) -> Result<Task, BackendError> {
        let storage = self.storage.lock().await;
        let existing = storage.get_task(&user.user_id, &task.id).await.map_err(storage_error)?;
        if existing.is_none() {
            return Err(BackendError::NotFound(format!("task {}", task.id)));
        }
        storage.store_task(&user.user_id, task).await.map_err(storage_error)?;
        Ok(task.clone())
    }

    async fn delete_task(&self, user: &UserContext, task_id: &str) -> Result<(), BackendError> {
        let storage = self.storage.lock().await;
        if storage.remove_task(&user.user_id, task_id).await.map_err(storage_error)? {
            Ok(())
        } else {
            Err(BackendError::NotFound(format!("task {}", task_id)))
        }
    }
}
