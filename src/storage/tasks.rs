use anyhow::{Context, Result};
use log::warn;
use sea_orm::TransactionTrait;

use super::db::LocalStorage;
use crate::backend::{Task, TaskStatus};
use crate::entities::task;
use crate::repositories::TaskRepository;
use crate::utils::datetime;

impl TryFrom<task::Model> for Task {
    type Error = anyhow::Error;

    fn try_from(model: task::Model) -> Result<Self> {
        let parse = |value: Option<String>| -> Result<_> {
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => Ok(Some(
                    datetime::parse_date(text).with_context(|| format!("Invalid stored date '{}'", text))?,
                )),
            }
        };

        Ok(Task {
            status: model.status.parse()?,
            start_date: parse(model.start_date)?,
            end_date: parse(model.end_date)?,
            id: model.id,
            title: model.title,
            description: model.description,
        })
    }
}

/// Row for `task` owned by `user_id`
pub(crate) fn task_to_model(user_id: &str, task: &Task, created_at: i64) -> task::Model {
    task::Model {
        user_id: user_id.to_string(),
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        start_date: task.start_date.map(datetime::format_ymd),
        end_date: task.end_date.map(datetime::format_ymd),
        status: task.status.as_wire().to_string(),
        created_at,
    }
}

fn models_to_tasks(models: Vec<task::Model>) -> Vec<Task> {
    models
        .into_iter()
        .filter_map(|model| {
            let id = model.id.clone();
            match Task::try_from(model) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!("⚠️  Skipping unreadable stored task {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

impl LocalStorage {
    /// All stored tasks of a user, oldest first
    pub async fn load_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let models = TaskRepository::get_for_user(&self.conn, user_id).await?;
        Ok(models_to_tasks(models))
    }

    /// Stored tasks of a user with `status`, oldest first
    pub async fn load_tasks_with_status(&self, user_id: &str, status: TaskStatus) -> Result<Vec<Task>> {
        let models = TaskRepository::get_for_user_with_status(&self.conn, user_id, status.as_wire()).await?;
        Ok(models_to_tasks(models))
    }

    pub async fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        TaskRepository::get_by_id(&self.conn, user_id, task_id)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    /// Insert or overwrite a single task
    pub async fn store_task(&self, user_id: &str, task: &Task) -> Result<()> {
        let model = task_to_model(user_id, task, chrono::Utc::now().timestamp_millis());
        TaskRepository::upsert(&self.conn, model).await
    }

    /// Replace the stored tasks of one status in a single transaction
    pub async fn store_tasks_for_status(&self, user_id: &str, status: TaskStatus, tasks: &[Task]) -> Result<()> {
        let base = chrono::Utc::now().timestamp_millis();
        let models = tasks
            .iter()
            .enumerate()
            .map(|(offset, task)| task_to_model(user_id, task, base + offset as i64))
            .collect();

        let txn = self.conn.begin().await?;
        TaskRepository::replace_status(&txn, user_id, status.as_wire(), models).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Remove a task. Returns whether it existed.
    pub async fn remove_task(&self, user_id: &str, task_id: &str) -> Result<bool> {
        TaskRepository::delete(&self.conn, user_id, task_id).await
    }

    /// Drop every stored task of a user
    pub async fn clear_user(&self, user_id: &str) -> Result<()> {
        TaskRepository::delete_for_user(&self.conn, user_id).await?;
        Ok(())
    }
}
