use super::actions::{Action, FormField};
use crate::auth::{signup_error_message, AuthService, LoginOutcome, LoginStatus};
use crate::config::{AwsConfig, DictationConfig};
use crate::constants::SIGNUP_SUCCESS;
use crate::notify::{login_message, Notifier};
use crate::speech::{DictationEvent, DictationSession};
use crate::sync::SyncService;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub type TaskId = u64;

#[derive(Debug)]
pub struct BackgroundTask {
    pub id: TaskId,
    pub handle: JoinHandle<()>,
    pub description: String,
    pub started_at: std::time::Instant,
}

/// Runs service calls off the UI loop; every result comes back as an [`Action`]
pub struct TaskManager {
    tasks: HashMap<TaskId, BackgroundTask>,
    next_task_id: TaskId,
    action_sender: mpsc::UnboundedSender<Action>,
}

impl TaskManager {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();

        (
            Self {
                tasks: HashMap::new(),
                next_task_id: 1,
                action_sender: tx,
            },
            rx,
        )
    }

    fn spawn<Fut>(&mut self, description: String, future: Fut) -> TaskId
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let task = BackgroundTask {
            id: task_id,
            handle: tokio::spawn(future),
            description,
            started_at: std::time::Instant::now(),
        };

        self.tasks.insert(task_id, task);
        task_id
    }

    /// Refresh every list, then publish the cache
    pub fn spawn_sync(&mut self, sync_service: SyncService) -> TaskId {
        let action_sender = self.action_sender.clone();

        self.spawn("Background sync".to_string(), async move {
            match sync_service.refresh_all().await {
                Ok(status) => {
                    let _ = action_sender.send(Action::SyncCompleted(status));
                }
                Err(e) => {
                    let _ = action_sender.send(Action::SyncFailed(e.to_string()));
                }
            }
            let _ = action_sender.send(Action::DataLoaded(sync_service.all_tasks().await));
        })
    }

    /// Publish the current cache contents
    pub fn spawn_data_load(&mut self, sync_service: SyncService) -> TaskId {
        let action_sender = self.action_sender.clone();

        self.spawn("Loading tasks".to_string(), async move {
            let _ = action_sender.send(Action::DataLoaded(sync_service.all_tasks().await));
        })
    }

    /// Spawn a task operation (create, update, delete).
    ///
    /// `operation` resolves to the success message for the status bar.
    pub fn spawn_task_operation<F, Fut>(&mut self, operation: F, description: String) -> TaskId
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        let action_sender = self.action_sender.clone();

        self.spawn(description, async move {
            let action = match operation().await {
                Ok(message) => Action::TaskOperationCompleted(message),
                Err(e) => Action::TaskOperationFailed(e.to_string()),
            };
            let _ = action_sender.send(action);
        })
    }

    /// Sign in, then publish the login notification.
    ///
    /// A failed notification is logged and does not affect the login.
    pub fn spawn_login(
        &mut self,
        auth: AuthService,
        notifier: Arc<dyn Notifier>,
        email: String,
        password: String,
    ) -> TaskId {
        let action_sender = self.action_sender.clone();

        self.spawn(format!("Login {}", email), async move {
            let result = auth.login(&email, &password).await;
            let (status, message) = LoginStatus::for_result(&result);

            if let Ok(LoginOutcome::Authenticated(session)) = &result {
                match notifier.publish(&login_message(&session.username)).await {
                    Ok(Some(message_id)) => log::info!("📣 Login notification sent ({})", message_id),
                    Ok(None) => {}
                    Err(e) => log::warn!("⚠️  Login notification failed: {}", e),
                }
            }

            let _ = action_sender.send(Action::LoginCompleted {
                status,
                message: message.to_string(),
            });
        })
    }

    pub fn spawn_sign_up(&mut self, auth: AuthService, name: String, email: String, password: String) -> TaskId {
        let action_sender = self.action_sender.clone();

        self.spawn(format!("Sign up {}", email), async move {
            let action = match auth.sign_up(&name, &email, &password).await {
                Ok(_) => Action::SignUpCompleted {
                    success: true,
                    message: SIGNUP_SUCCESS.to_string(),
                },
                Err(e) => Action::SignUpCompleted {
                    success: false,
                    message: signup_error_message(&e.to_string()),
                },
            };
            let _ = action_sender.send(action);
        })
    }

    /// Forget cached tasks, then end the session
    pub fn spawn_logout(&mut self, auth: AuthService, sync_service: SyncService) -> TaskId {
        let action_sender = self.action_sender.clone();

        self.spawn("Logout".to_string(), async move {
            sync_service.clear_cache().await;
            auth.logout().await;
            let _ = action_sender.send(Action::LoggedOut);
        })
    }

    /// Send `action` after `millis` milliseconds
    pub fn spawn_delayed(&mut self, action: Action, millis: u64) -> TaskId {
        let action_sender = self.action_sender.clone();

        self.spawn(format!("Delayed {:?}", action), async move {
            tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
            let _ = action_sender.send(action);
        })
    }

    /// Start dictating into `field`; the returned sender stops it.
    ///
    /// Every [`DictationEvent`] arrives as [`Action::Dictation`], ending with
    /// [`DictationEvent::Stopped`].
    pub fn spawn_dictation(
        &mut self,
        config: DictationConfig,
        aws: AwsConfig,
        field: FormField,
    ) -> oneshot::Sender<()> {
        let action_sender = self.action_sender.clone();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        self.spawn(format!("Dictation into {:?}", field), async move {
            let send = |event: DictationEvent| {
                let _ = action_sender.send(Action::Dictation { field, event });
            };

            let (events_tx, mut events_rx) = mpsc::unbounded_channel();
            let started = match DictationSession::from_config(&config, &aws) {
                Ok(session) => session.start(events_tx).await,
                Err(e) => Err(e),
            };
            let mut handle = match started {
                Ok(handle) => handle,
                Err(e) => {
                    send(DictationEvent::Error(format!("{:#}", e)));
                    send(DictationEvent::Stopped);
                    return;
                }
            };

            let mut stop_requested = false;
            loop {
                tokio::select! {
                    _ = &mut stop_rx, if !stop_requested => {
                        stop_requested = true;
                        handle.stop();
                    }
                    event = events_rx.recv() => match event {
                        Some(DictationEvent::Stopped) | None => break,
                        Some(event) => send(event),
                    },
                }
            }
            send(DictationEvent::Stopped);
        });

        stop_tx
    }

    /// Check for completed tasks and clean them up
    pub fn cleanup_finished_tasks(&mut self) -> Vec<(TaskId, String)> {
        let finished: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.handle.is_finished())
            .map(|(id, _)| *id)
            .collect();

        finished
            .into_iter()
            .filter_map(|task_id| {
                self.tasks.remove(&task_id).map(|task| {
                    let elapsed = task.started_at.elapsed();
                    (task_id, format!("{} ({} ms)", task.description, elapsed.as_millis()))
                })
            })
            .collect()
    }

    /// Check if any sync tasks are currently running
    pub fn is_syncing(&self) -> bool {
        self.tasks.values().any(|task| task.description.contains("sync"))
    }

    /// Cancel all running tasks
    pub fn cancel_all_tasks(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.handle.abort();
        }
    }

    /// Get the number of active tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        // Cancel all tasks when the manager is dropped
        self.cancel_all_tasks();
    }
}
