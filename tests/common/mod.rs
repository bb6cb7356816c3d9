//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use taskdeck::auth::{AuthError, AuthService, IdentityProvider, LoginOutcome, Session, SignUpOutcome, SignUpRequest};
use taskdeck::backend::{BackendError, Task, TaskBackend, TaskDraft, TaskStatus, UserContext};
use taskdeck::sync::SyncService;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "Correct-horse-1";

pub fn session_for(username: &str) -> Session {
    Session {
        username: username.to_string(),
        id_token: "id-token".to_string(),
        access_token: "access-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

/// Accepts exactly one email/password pair
pub struct StubProvider {
    pub sign_outs: AtomicU64,
    pub refreshes: AtomicU64,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            sign_outs: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError> {
        if request.email == EMAIL {
            return Err(AuthError::UsernameExists("User already exists".to_string()));
        }
        Ok(SignUpOutcome {
            user_confirmed: false,
            user_sub: Some("sub-1".to_string()),
        })
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        if username == EMAIL && password == PASSWORD {
            Ok(LoginOutcome::Authenticated(session_for(username)))
        } else {
            Err(AuthError::InvalidCredentials("Incorrect username or password.".to_string()))
        }
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(session_for(&session.username))
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub async fn signed_in_auth() -> AuthService {
    let auth = AuthService::new(Arc::new(StubProvider::new()), None);
    auth.login(EMAIL, PASSWORD).await.unwrap();
    auth
}

/// In-memory task store that assigns sequential ids
#[derive(Default)]
pub struct MemoryBackend {
    pub tasks: Mutex<Vec<Task>>,
    next_id: AtomicU64,
    pub fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let backend = Self::default();
        backend.next_id.store(tasks.len() as u64, Ordering::SeqCst);
        *backend.tasks.lock().unwrap() = tasks;
        backend
    }

    fn check_writes(&self) -> Result<(), BackendError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Http {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TaskBackend for MemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn fetch_tasks(&self, _user: &UserContext, status: TaskStatus) -> Result<Vec<Task>, BackendError> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().filter(|t| t.status == status).cloned().collect())
    }

    async fn create_task(&self, _user: &UserContext, draft: &TaskDraft) -> Result<Task, BackendError> {
        self.check_writes()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let task = Task {
            id: id.to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: draft.status,
        };
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, _user: &UserContext, task: &Task) -> Result<Task, BackendError> {
        self.check_writes()?;
        let mut tasks = self.tasks.lock().unwrap();
        let stored = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| BackendError::NotFound(task.id.clone()))?;
        *stored = task.clone();
        Ok(task.clone())
    }

    async fn delete_task(&self, _user: &UserContext, task_id: &str) -> Result<(), BackendError> {
        self.check_writes()?;
        self.tasks.lock().unwrap().retain(|t| t.id != task_id);
        Ok(())
    }
}

pub fn task(id: &str, title: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} details", title),
        start_date: None,
        end_date: None,
        status,
    }
}

pub async fn sync_with(tasks: Vec<Task>) -> (SyncService, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::with_tasks(tasks));
    let sync = SyncService::new(backend.clone(), signed_in_auth().await, None);
    (sync, backend)
}
