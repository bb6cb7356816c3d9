use crate::auth::LoginStatus;
use crate::backend::{Task, TaskDraft, TaskStatus};
use crate::speech::DictationEvent;
use crate::sync::SyncStatus;

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    Login,
    #[default]
    Signup,
    Dashboard,
}

/// Focusable field of the task form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    StartDate,
    EndDate,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Description,
        FormField::StartDate,
        FormField::EndDate,
        FormField::Status,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Fields that accept dictated text
    pub fn accepts_dictation(self) -> bool {
        matches!(self, FormField::Title | FormField::Description)
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::StartDate => "Start date (YYYY-MM-DD)",
            FormField::EndDate => "End date (YYYY-MM-DD)",
            FormField::Status => "Status",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SwitchScreen(Screen),
    NavigateToView(TaskStatus),

    // Authentication
    SubmitLogin {
        email: String,
        password: String,
    },
    LoginCompleted {
        status: LoginStatus,
        message: String,
    },
    SubmitSignUp {
        name: String,
        email: String,
        password: String,
    },
    SignUpCompleted {
        success: bool,
        message: String,
    },
    Logout,
    LoggedOut,

    // Task list
    NextTask,
    PreviousTask,

    // Task operations
    CreateTask(TaskDraft),
    UpdateTask {
        id: String,
        draft: TaskDraft,
    },
    SetTaskStatus {
        id: String,
        status: TaskStatus,
    },
    DeleteTask(String),
    TaskOperationCompleted(String),
    TaskOperationFailed(String),

    // Sync operations
    StartSync,
    SyncCompleted(SyncStatus),
    SyncFailed(String),
    RefreshData,
    DataLoaded(Vec<Task>),

    // Dictation
    ToggleDictation(FormField),
    Dictation {
        field: FormField,
        event: DictationEvent,
    },

    // UI operations
    ShowDialog(DialogType),
    HideDialog,

    // App control
    Quit,
    None,
}

#[derive(Debug, Clone)]
pub enum DialogType {
    TaskCreation {
        status: TaskStatus,
    },
    TaskEdit(Task),
    DeleteConfirmation {
        task_id: String,
        title: String,
    },
    Error(String),
    Info(String),
    Help,
    Logs,
}
