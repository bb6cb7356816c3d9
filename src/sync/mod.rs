//! Task collection service for the taskdeck application.
//!
//! This module provides the [`SyncService`] struct, the single owner of the
//! signed-in user's tasks. It talks to the configured [`TaskBackend`], keeps
//! an in-memory [`TaskCache`] that the views read from, and optionally mirrors
//! that cache into SQLite so lists appear before the first fetch completes.
//!
//! Status changes and edits are optimistic: the cache is updated first and
//! rolled back when the backend rejects the change. Adds and deletes wait for
//! the backend. Remote calls are not retried.

pub mod cache;

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

pub use cache::TaskCache;

use crate::auth::AuthService;
use crate::backend::{Task, TaskBackend, TaskDraft, TaskStatus, UserContext};
use crate::constants::{ERROR_NOT_AUTHENTICATED, ERROR_NO_USER_ID, ERROR_TASK_NOT_FOUND};
use crate::storage::LocalStorage;

/// Service that owns the task collection of the signed-in user.
///
/// Cheap to clone; all clones share the same cache.
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use taskdeck::backend::{TaskDraft, TaskStatus};
/// use taskdeck::sync::SyncService;
/// # use taskdeck::auth::AuthService;
/// # use taskdeck::backend::TaskBackend;
///
/// # async fn example(backend: Arc<dyn TaskBackend>, auth: AuthService) -> anyhow::Result<()> {
/// let sync_service = SyncService::new(backend, auth, None);
///
/// sync_service.fetch_tasks(TaskStatus::Pending).await?;
/// sync_service.add_task(TaskDraft::new("Write report", "Quarterly numbers")).await?;
///
/// let pending = sync_service.tasks_with_status(TaskStatus::Pending).await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SyncService {
    backend: Arc<dyn TaskBackend>,
    auth: AuthService,
    storage: Option<Arc<Mutex<LocalStorage>>>,
    state: Arc<Mutex<SyncState>>,
    sync_in_progress: Arc<Mutex<bool>>,
}

#[derive(Default)]
struct SyncState {
    cache: TaskCache,
    pending_requests: usize,
    last_error: Option<String>,
}

/// Represents the current status of a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// No refresh has run yet
    Idle,
    /// A refresh is already running
    InProgress,
    /// Every list was fetched
    Success,
    /// At least one list failed to load
    Error {
        /// Message of the first failure
        message: String,
    },
}

impl SyncService {
    /// Creates a new `SyncService`.
    ///
    /// `storage` enables the on-disk mirror of the cache; pass `None` to keep
    /// tasks in memory only. The mirror is ignored for the `local` backend,
    /// whose tasks already live in that database.
    pub fn new(backend: Arc<dyn TaskBackend>, auth: AuthService, storage: Option<Arc<Mutex<LocalStorage>>>) -> Self {
        let storage = if backend.backend_type() == "local" {
            if storage.is_some() {
                info!("💾 Cache mirror disabled: the local backend stores tasks itself");
            }
            None
        } else {
            storage
        };
        Self {
            backend,
            auth,
            storage,
            state: Arc::new(Mutex::new(SyncState::default())),
            sync_in_progress: Arc::new(Mutex::new(false)),
        }
    }

    pub fn backend_type(&self) -> &str {
        self.backend.backend_type()
    }

    /// Identity for backend calls, or the error every operation reports without one
    async fn user(&self) -> Result<UserContext> {
        if !self.auth.is_authenticated() {
            return Err(anyhow!(ERROR_NOT_AUTHENTICATED));
        }
        match self.auth.fresh_user_context().await {
            Some(user) if !user.user_id.is_empty() => Ok(user),
            _ => Err(anyhow!(ERROR_NO_USER_ID)),
        }
    }

    async fn begin_request(&self) {
        let mut state = self.state.lock().await;
        state.pending_requests += 1;
        state.last_error = None;
    }

    async fn finish_request(&self, failure: Option<&str>) {
        let mut state = self.state.lock().await;
        state.pending_requests = state.pending_requests.saturating_sub(1);
        if let Some(message) = failure {
            state.last_error = Some(message.to_string());
        }
    }

    async fn record_error(&self, message: &str) {
        self.state.lock().await.last_error = Some(message.to_string());
    }

    /// Fetch the tasks with `status` and replace that list in the cache
    pub async fn fetch_tasks(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let user = self.user().await?;
        self.begin_request().await;

        match self.backend.fetch_tasks(&user, status).await {
            Ok(tasks) => {
                self.state.lock().await.cache.replace_status(status, tasks.clone());
                self.finish_request(None).await;
                self.mirror_status(&user.user_id, status, &tasks).await;
                Ok(tasks)
            }
            Err(e) => {
                let message = e.to_string();
                error!("❌ {}", message);
                self.finish_request(Some(&message)).await;
                Err(anyhow!(message))
            }
        }
    }

    /// Fetch every list.
    ///
    /// Only one refresh runs at a time; a call made while another is running
    /// returns [`SyncStatus::InProgress`] immediately.
    pub async fn refresh_all(&self) -> Result<SyncStatus> {
        {
            let mut sync_guard = self.sync_in_progress.lock().await;
            if *sync_guard {
                return Ok(SyncStatus::InProgress);
            }
            *sync_guard = true;
        }

        let result = self.perform_refresh().await;

        {
            let mut sync_guard = self.sync_in_progress.lock().await;
            *sync_guard = false;
        }

        result
    }

    async fn perform_refresh(&self) -> Result<SyncStatus> {
        info!("🔄 Refreshing task lists...");
        self.user().await?;

        let mut first_failure = None;
        for status in TaskStatus::ALL {
            match self.fetch_tasks(status).await {
                Ok(tasks) => info!("✅ Loaded {} {} tasks", tasks.len(), status.as_wire()),
                Err(e) => {
                    if first_failure.is_none() {
                        first_failure = Some(e.to_string());
                    }
                }
            }
        }

        Ok(match first_failure {
            Some(message) => {
                // Keep the first failure visible even if a later list loaded
                self.record_error(&message).await;
                SyncStatus::Error { message }
            }
            None => SyncStatus::Success,
        })
    }

    pub async fn is_syncing(&self) -> bool {
        *self.sync_in_progress.lock().await
    }

    /// Create a task and append the stored record
    pub async fn add_task(&self, draft: TaskDraft) -> Result<Task> {
        let user = self.user().await?;
        self.begin_request().await;

        match self.backend.create_task(&user, &draft).await {
            Ok(task) => {
                info!("✅ Created task {} ({})", task.id, task.title);
                self.state.lock().await.cache.upsert(task.clone());
                self.finish_request(None).await;
                self.mirror_upsert(&user.user_id, &task).await;
                Ok(task)
            }
            Err(e) => {
                let message = e.to_string();
                error!("❌ {}", message);
                self.finish_request(Some(&message)).await;
                Err(anyhow!(message))
            }
        }
    }

    /// Move a task to `status`
    pub async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> Result<Task> {
        self.apply_optimistic(task_id, |task| Task {
            status,
            ..task.clone()
        })
        .await
    }

    /// Replace the editable fields of a task
    pub async fn update_task_details(&self, task_id: &str, draft: TaskDraft) -> Result<Task> {
        self.apply_optimistic(task_id, |task| task.with_draft(&draft)).await
    }

    async fn apply_optimistic<F>(&self, task_id: &str, change: F) -> Result<Task>
    where
        F: FnOnce(&Task) -> Task,
    {
        let user = self.user().await?;

        let (previous, optimistic) = {
            let mut state = self.state.lock().await;
            let Some(previous) = state.cache.get(task_id).cloned() else {
                state.last_error = Some(ERROR_TASK_NOT_FOUND.to_string());
                return Err(anyhow!(ERROR_TASK_NOT_FOUND));
            };
            let optimistic = change(&previous);
            state.cache.upsert(optimistic.clone());
            state.pending_requests += 1;
            state.last_error = None;
            (previous, optimistic)
        };

        match self.backend.update_task(&user, &optimistic).await {
            Ok(stored) => {
                self.state.lock().await.cache.replace(task_id, stored.clone());
                self.finish_request(None).await;
                self.mirror_upsert(&user.user_id, &stored).await;
                Ok(stored)
            }
            Err(e) => {
                let message = e.to_string();
                warn!("↩️  Rolling back task {}: {}", task_id, message);
                self.state.lock().await.cache.upsert(previous);
                self.finish_request(Some(&message)).await;
                Err(anyhow!(message))
            }
        }
    }

    /// Delete a task remotely, then drop it from every list
    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        let user = self.user().await?;
        self.begin_request().await;

        match self.backend.delete_task(&user, task_id).await {
            Ok(()) => {
                info!("🗑️  Deleted task {}", task_id);
                self.state.lock().await.cache.remove(task_id);
                self.finish_request(None).await;
                self.mirror_remove(&user.user_id, task_id).await;
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                error!("❌ {}", message);
                self.finish_request(Some(&message)).await;
                Err(anyhow!(message))
            }
        }
    }

    pub async fn tasks_with_status(&self, status: TaskStatus) -> Vec<Task> {
        self.state.lock().await.cache.with_status(status)
    }

    pub async fn all_tasks(&self) -> Vec<Task> {
        self.state.lock().await.cache.all().to_vec()
    }

    pub async fn get_task(&self, task_id: &str) -> Option<Task> {
        self.state.lock().await.cache.get(task_id).cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.pending_requests > 0
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    /// Fill the cache from the on-disk mirror. Returns the number of tasks loaded.
    pub async fn load_cached(&self) -> Result<usize> {
        let (Some(storage), Some(user_id)) = (&self.storage, self.auth.user_id()) else {
            return Ok(0);
        };

        let tasks = storage.lock().await.load_tasks(&user_id).await?;
        let count = tasks.len();
        self.state.lock().await.cache.replace_all(tasks);
        info!("💾 Loaded {} cached tasks", count);
        Ok(count)
    }

    /// Forget every task of the current user, in memory and on disk.
    ///
    /// Call before signing out; the user id is needed to find the rows.
    pub async fn clear_cache(&self) {
        {
            let mut state = self.state.lock().await;
            state.cache.clear();
            state.last_error = None;
        }

        if let (Some(storage), Some(user_id)) = (&self.storage, self.auth.user_id()) {
            if let Err(e) = storage.lock().await.clear_user(&user_id).await {
                warn!("⚠️  Failed to clear cached tasks: {:#}", e);
            }
        }
    }

    async fn mirror_status(&self, user_id: &str, status: TaskStatus, tasks: &[Task]) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.lock().await.store_tasks_for_status(user_id, status, tasks).await {
                warn!("⚠️  Failed to cache {} tasks: {:#}", status.as_wire(), e);
            }
        }
    }

    async fn mirror_upsert(&self, user_id: &str, task: &Task) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.lock().await.store_task(user_id, task).await {
                warn!("⚠️  Failed to cache task {}: {:#}", task.id, e);
            }
        }
    }

    async fn mirror_remove(&self, user_id: &str, task_id: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.lock().await.remove_task(user_id, task_id).await {
                warn!("⚠️  Failed to uncache task {}: {:#}", task_id, e);
            }
        }
    }
}
