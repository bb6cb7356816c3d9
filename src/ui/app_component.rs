use crate::auth::LoginStatus;
use crate::backend::{Task, TaskStatus};
use crate::constants::{
    APP_TITLE, ERROR_DICTATION_UNAVAILABLE, LOGIN_REDIRECT_MILLIS, SIGNUP_REDIRECT_MILLIS, SUCCESS_LOGGED_OUT,
    SUCCESS_TASK_ADDED, SUCCESS_TASK_COMPLETED, SUCCESS_TASK_DELETED, SUCCESS_TASK_REOPENED, SUCCESS_TASK_STARTED,
    SUCCESS_TASK_UPDATED,
};
use crate::speech::DictationEvent;
use crate::sync::SyncStatus;
use crate::ui::components::{AuthComponent, DialogComponent, SidebarComponent, StatusBar, TaskListComponent};
use crate::ui::core::{
    actions::{Action, DialogType, FormField, Screen},
    event_handler::EventType,
    task_manager::{TaskId, TaskManager},
    AppContext, Component,
};
use crate::ui::layout::LayoutManager;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

/// Actions a single event may chain through before the loop gives up
const MAX_FOLLOW_UPS: usize = 8;

/// Transient feedback shown in the status bar
#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    is_error: bool,
    shown_at: Instant,
}

pub struct AppComponent {
    // Component composition
    auth_view: AuthComponent,
    sidebar: SidebarComponent,
    task_list: TaskListComponent,
    dialog: DialogComponent,

    // Application state
    screen: Screen,
    tasks: Vec<Task>,
    view: TaskStatus,
    status_message: Option<StatusMessage>,

    // Services
    ctx: AppContext,
    task_manager: TaskManager,
    background_action_rx: mpsc::UnboundedReceiver<Action>,
    dictation_stop: Option<oneshot::Sender<()>>,

    should_quit: bool,
    active_sync_task: Option<TaskId>,
}

fn status_success_message(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => SUCCESS_TASK_REOPENED,
        TaskStatus::InProgress => SUCCESS_TASK_STARTED,
        TaskStatus::Completed => SUCCESS_TASK_COMPLETED,
    }
}

impl AppComponent {
    pub fn new(ctx: AppContext, screen: Screen) -> Self {
        let view = ctx.config.ui.default_status();
        let (task_manager, background_action_rx) = TaskManager::new();
        let auth_mode = if screen == Screen::Login { Screen::Login } else { Screen::Signup };

        Self {
            auth_view: AuthComponent::new(auth_mode),
            sidebar: SidebarComponent::new(view),
            task_list: TaskListComponent::new(view),
            dialog: DialogComponent::new(),
            screen,
            tasks: Vec::new(),
            view,
            status_message: None,
            ctx,
            task_manager,
            background_action_rx,
            dictation_stop: None,
            should_quit: false,
            active_sync_task: None,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn view(&self) -> TaskStatus {
        self.view
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_syncing(&self) -> bool {
        self.active_sync_task.is_some()
    }

    pub fn dialog(&self) -> &DialogComponent {
        &self.dialog
    }

    pub fn status_message(&self) -> Option<(&str, bool)> {
        self.status_message
            .as_ref()
            .map(|message| (message.text.as_str(), message.is_error))
    }

    pub fn active_task_count(&self) -> usize {
        self.task_manager.task_count()
    }

    /// Kick off the first load when starting on the dashboard
    pub fn start(&mut self) {
        if self.screen == Screen::Dashboard {
            self.enter_dashboard();
        }
    }

    /// Replace the displayed tasks, e.g. with what the on-disk cache held at startup
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.sync_component_data();
    }

    fn log(&self, message: String) {
        self.ctx.logger.log(message);
    }

    fn set_message(&mut self, text: impl Into<String>, is_error: bool) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error,
            shown_at: Instant::now(),
        });
    }

    /// Expire the status message
    pub fn tick(&mut self) -> bool {
        let timeout = Duration::from_secs(self.ctx.config.ui.message_timeout_seconds);
        match &self.status_message {
            Some(message) if message.shown_at.elapsed() >= timeout => {
                self.status_message = None;
                true
            }
            _ => false,
        }
    }

    fn enter_dashboard(&mut self) {
        self.screen = Screen::Dashboard;
        self.log(format!("Navigation: Dashboard ({})", self.view.label()));
        self.task_manager.spawn_data_load(self.ctx.sync_service.clone());
        self.start_sync();
    }

    fn start_sync(&mut self) {
        if self.active_sync_task.is_none() {
            self.log("Sync: Refreshing all lists".to_string());
            self.active_sync_task = Some(self.task_manager.spawn_sync(self.ctx.sync_service.clone()));
        } else {
            self.log("Sync: Already in progress, ignoring".to_string());
        }
    }

    fn stop_dictation(&mut self) {
        if let Some(stop) = self.dictation_stop.take() {
            self.log("Dictation: Stopping".to_string());
            let _ = stop.send(());
        }
    }

    /// Apply a change to the displayed task right away; the reload after the
    /// request completes brings back the stored state
    fn apply_locally(&mut self, id: &str, change: impl FnOnce(&Task) -> Task) {
        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
            *task = change(task);
        }
    }

    fn sync_component_data(&mut self) {
        self.sidebar.update_counts(&self.tasks);
        self.task_list.update_data(&self.tasks, self.view);
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char('?') => Action::ShowDialog(DialogType::Help),
            KeyCode::Char('G') => {
                self.dialog.set_logs(self.ctx.logger.get_logs());
                Action::ShowDialog(DialogType::Logs)
            }
            KeyCode::Char('r') => Action::StartSync,
            KeyCode::Char('L') => Action::Logout,
            KeyCode::Esc => Action::Quit,
            _ => Action::None,
        }
    }

    fn route_key(&mut self, key: KeyEvent) -> Action {
        if self.screen != Screen::Dashboard {
            return self.auth_view.handle_key_events(key);
        }
        if self.dialog.is_visible() {
            return self.dialog.handle_key_events(key);
        }

        let sidebar_action = self.sidebar.handle_key_events(key);
        if !matches!(sidebar_action, Action::None) {
            return sidebar_action;
        }
        let task_list_action = self.task_list.handle_key_events(key);
        if !matches!(task_list_action, Action::None) {
            return task_list_action;
        }
        self.handle_global_key(key)
    }

    /// Pipe an action through the components, then handle it at app level.
    ///
    /// Follow-up actions returned by the app handler go around again.
    pub async fn dispatch(&mut self, action: Action) {
        let mut action = action;
        for _ in 0..MAX_FOLLOW_UPS {
            if matches!(action, Action::None) {
                break;
            }
            let piped = self.update(action);
            action = self.handle_app_action(piped).await;
        }
        self.sync_component_data();
    }

    /// Handle app-level actions that need services
    pub async fn handle_app_action(&mut self, action: Action) -> Action {
        match action {
            Action::Quit => {
                self.stop_dictation();
                self.should_quit = true;
                Action::None
            }

            // Navigation
            Action::SwitchScreen(Screen::Dashboard) => {
                self.enter_dashboard();
                Action::None
            }
            Action::SwitchScreen(screen) => {
                self.log(format!("Navigation: {:?}", screen));
                self.screen = screen;
                Action::None
            }
            Action::NavigateToView(status) => {
                self.log(format!("Navigation: {} list", status.label()));
                self.view = status;
                Action::None
            }

            // Authentication
            Action::SubmitLogin { email, password } => {
                self.log(format!("Auth: Signing in {}", email));
                self.task_manager
                    .spawn_login(self.ctx.auth.clone(), self.ctx.notifier.clone(), email, password);
                Action::None
            }
            Action::LoginCompleted { status, message } => {
                self.log(format!("Auth: {:?} - {}", status, message));
                if status == LoginStatus::Success {
                    self.task_manager
                        .spawn_delayed(Action::SwitchScreen(Screen::Dashboard), LOGIN_REDIRECT_MILLIS);
                }
                Action::None
            }
            Action::SubmitSignUp { name, email, password } => {
                self.log(format!("Auth: Creating account for {}", email));
                self.task_manager
                    .spawn_sign_up(self.ctx.auth.clone(), name, email, password);
                Action::None
            }
            Action::SignUpCompleted { success, message } => {
                self.log(format!("Auth: Sign up {} - {}", if success { "succeeded" } else { "failed" }, message));
                if success {
                    self.task_manager
                        .spawn_delayed(Action::SwitchScreen(Screen::Login), SIGNUP_REDIRECT_MILLIS);
                }
                Action::None
            }
            Action::Logout => {
                self.log("Auth: Signing out".to_string());
                self.stop_dictation();
                self.task_manager
                    .spawn_logout(self.ctx.auth.clone(), self.ctx.sync_service.clone());
                Action::None
            }
            Action::LoggedOut => {
                self.tasks.clear();
                self.status_message = None;
                self.log(SUCCESS_LOGGED_OUT.to_string());
                Action::SwitchScreen(Screen::Login)
            }

            // Task operations with background execution
            Action::CreateTask(draft) => {
                self.stop_dictation();
                self.log(format!("Task: Creating '{}' ({})", draft.title, draft.status.label()));
                let sync = self.ctx.sync_service.clone();
                self.task_manager.spawn_task_operation(
                    move || async move { sync.add_task(draft).await.map(|_| SUCCESS_TASK_ADDED.to_string()) },
                    "Create task".to_string(),
                );
                Action::None
            }
            Action::UpdateTask { id, draft } => {
                self.stop_dictation();
                self.log(format!("Task: Updating {} '{}'", id, draft.title));
                self.apply_locally(&id, |task| task.with_draft(&draft));
                let sync = self.ctx.sync_service.clone();
                self.task_manager.spawn_task_operation(
                    move || async move {
                        sync.update_task_details(&id, draft)
                            .await
                            .map(|_| SUCCESS_TASK_UPDATED.to_string())
                    },
                    "Update task".to_string(),
                );
                Action::None
            }
            Action::SetTaskStatus { id, status } => {
                self.log(format!("Task: Moving {} to {}", id, status.label()));
                self.apply_locally(&id, |task| Task {
                    status,
                    ..task.clone()
                });
                let sync = self.ctx.sync_service.clone();
                self.task_manager.spawn_task_operation(
                    move || async move {
                        sync.update_task_status(&id, status)
                            .await
                            .map(|_| status_success_message(status).to_string())
                    },
                    "Update task status".to_string(),
                );
                Action::None
            }
            Action::DeleteTask(id) => {
                self.log(format!("Task: Deleting {}", id));
                let sync = self.ctx.sync_service.clone();
                self.task_manager.spawn_task_operation(
                    move || async move { sync.delete_task(&id).await.map(|_| SUCCESS_TASK_DELETED.to_string()) },
                    "Delete task".to_string(),
                );
                Action::None
            }
            Action::TaskOperationCompleted(message) => {
                self.log(format!("Task: {}", message));
                self.set_message(message, false);
                Action::RefreshData
            }
            Action::TaskOperationFailed(error) => {
                self.log(format!("Task: Failed - {}", error));
                self.set_message(error, true);
                Action::RefreshData
            }

            // Sync operations
            Action::StartSync => {
                self.start_sync();
                Action::None
            }
            Action::SyncCompleted(status) => {
                self.active_sync_task = None;
                match status {
                    SyncStatus::Error { message } => {
                        self.log(format!("Sync: Completed with errors - {}", message));
                        self.set_message(message, true);
                    }
                    other => self.log(format!("Sync: {:?}", other)),
                }
                Action::None
            }
            Action::SyncFailed(error) => {
                self.active_sync_task = None;
                self.log(format!("Sync: Failed with error: {}", error));
                Action::ShowDialog(DialogType::Error(error))
            }
            Action::RefreshData => {
                self.task_manager.spawn_data_load(self.ctx.sync_service.clone());
                Action::None
            }
            Action::DataLoaded(tasks) => {
                self.tasks = tasks;
                Action::None
            }

            // Dictation
            Action::ToggleDictation(field) => {
                if self.dictation_stop.is_some() {
                    self.stop_dictation();
                } else if !self.ctx.config.dictation.enabled {
                    if let Some(form) = self.dialog.task_form.as_mut() {
                        form.dictation_error = Some(ERROR_DICTATION_UNAVAILABLE.to_string());
                    }
                } else {
                    self.start_dictation(field);
                }
                Action::None
            }
            Action::Dictation { field, event } => {
                match event {
                    DictationEvent::Stopped => {
                        self.dictation_stop = None;
                        self.log(format!("Dictation: Stopped ({})", field.label()));
                    }
                    DictationEvent::Error(message) => self.log(format!("Dictation: {}", message)),
                    _ => {}
                }
                Action::None
            }

            Action::HideDialog => {
                self.stop_dictation();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn start_dictation(&mut self, field: FormField) {
        self.log(format!("Dictation: Listening for {}", field.label()));
        let dictation = self.ctx.config.dictation.clone();
        let aws = self.ctx.config.aws.clone();
        self.dictation_stop = Some(self.task_manager.spawn_dictation(dictation, aws, field));
        self.dialog.set_dictating(Some(field));
    }

    /// Drain results sent by background tasks
    pub fn process_background_actions(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.background_action_rx.try_recv() {
            actions.push(action);
        }

        for (task_id, description) in self.task_manager.cleanup_finished_tasks() {
            log::debug!("Background task {} finished: {}", task_id, description);
        }

        actions
    }

    /// Process a terminal event through the component hierarchy
    pub async fn handle_event(&mut self, event_type: EventType) -> anyhow::Result<()> {
        let action = match event_type {
            EventType::Key(key) => self.route_key(key),
            EventType::Resize(_, _) | EventType::Tick | EventType::Other => Action::None,
        };
        self.dispatch(action).await;
        Ok(())
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let user = self
            .ctx
            .auth
            .session()
            .map(|session| session.username)
            .unwrap_or_default();
        let header = Line::from(vec![
            Span::styled(
                format!(" {} ", APP_TITLE),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} • {}", user, self.ctx.sync_service.backend_type()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(Paragraph::new(header), area);
    }

    fn render_sync_status(&self, f: &mut Frame, rect: Rect) {
        let popup_area = LayoutManager::centered_rect_lines(40, 3, rect);
        let content = Paragraph::new(Line::from(Span::styled(
            "⟳ Loading tasks...",
            Style::default().fg(Color::Yellow),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).style(Style::default().fg(Color::Yellow)));

        f.render_widget(Clear, popup_area);
        f.render_widget(content, popup_area);
    }
}

impl Component for AppComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        self.route_key(key)
    }

    fn update(&mut self, action: Action) -> Action {
        let action = self.auth_view.update(action);
        let action = self.dialog.update(action);
        let action = self.sidebar.update(action);
        self.task_list.update(action)
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        if self.screen != Screen::Dashboard {
            self.auth_view.render(f, rect);
            return;
        }

        let (top, status_area) = LayoutManager::main_layout(rect);
        let (header, sidebar_area, list_area) = LayoutManager::dashboard_layout(top);

        self.render_header(f, header);
        self.sidebar.render(f, sidebar_area);
        self.task_list.render(f, list_area);

        StatusBar {
            message: self.status_message(),
            syncing: self.is_syncing(),
            dictating: self.dictation_stop.is_some(),
        }
        .render(f, status_area);

        if self.is_syncing() && self.tasks.is_empty() && !self.dialog.is_visible() {
            self.render_sync_status(f, rect);
        }

        if self.dialog.is_visible() {
            self.dialog.render(f, rect);
        }
    }
}
