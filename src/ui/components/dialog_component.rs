//! Modal dialog component.
//!
//! Hosts whichever dialog is open: the task form, the delete confirmation,
//! error and info messages, help and the log viewer. Rendering lives in the
//! [`dialogs`](super::dialogs) modules; this component owns the state and key
//! handling.

use crate::speech::DictationEvent;
use crate::ui::components::dialogs::{common::DialogScroll, system_dialogs, task_dialogs};
use crate::ui::components::task_form::TaskForm;
use crate::ui::core::{
    actions::{Action, DialogType},
    Component, FormField,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};

#[derive(Default)]
pub struct DialogComponent {
    pub dialog_type: Option<DialogType>,
    pub task_form: Option<TaskForm>,
    scroll: DialogScroll,
    logs: Vec<String>,
}

impl DialogComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.dialog_type.is_some()
    }

    pub fn is_task_form(&self) -> bool {
        self.task_form.is_some()
    }

    /// Snapshot of the log buffer shown by the logs dialog, newest first
    pub fn set_logs(&mut self, logs: Vec<String>) {
        self.logs = logs;
    }

    /// Mark which form field is receiving dictation
    pub fn set_dictating(&mut self, field: Option<FormField>) {
        if let Some(form) = self.task_form.as_mut() {
            form.dictating = field;
            form.dictation_preview = None;
            if field.is_some() {
                form.dictation_error = None;
            }
        }
    }

    pub fn dictating(&self) -> Option<FormField> {
        self.task_form.as_ref().and_then(|form| form.dictating)
    }

    fn clear_dialog(&mut self) {
        self.dialog_type = None;
        self.task_form = None;
        self.scroll.reset();
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Action {
        let Some(form) = self.task_form.as_mut() else {
            return Action::None;
        };
        let action = form.handle_key(key);
        if matches!(action, Action::CreateTask(_) | Action::UpdateTask { .. }) {
            self.clear_dialog();
        }
        action
    }
}

impl Component for DialogComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        match &self.dialog_type {
            Some(DialogType::TaskCreation { .. } | DialogType::TaskEdit(_)) => self.handle_form_key(key),
            Some(DialogType::DeleteConfirmation { task_id, .. }) => match key.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let action = Action::DeleteTask(task_id.clone());
                    self.clear_dialog();
                    action
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Action::HideDialog,
                _ => Action::None,
            },
            Some(DialogType::Error(_) | DialogType::Info(_)) => {
                if self.scroll.handle_key(key) {
                    Action::None
                } else {
                    Action::HideDialog
                }
            }
            Some(DialogType::Help) => match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Action::HideDialog,
                _ => {
                    self.scroll.handle_key(key);
                    Action::None
                }
            },
            Some(DialogType::Logs) => match key.code {
                KeyCode::Esc | KeyCode::Char('G') | KeyCode::Char('q') => Action::HideDialog,
                _ => {
                    self.scroll.handle_key(key);
                    Action::None
                }
            },
            None => Action::None,
        }
    }

    fn update(&mut self, action: Action) -> Action {
        match action {
            Action::ShowDialog(dialog_type) => {
                self.scroll.reset();
                self.task_form = match &dialog_type {
                    DialogType::TaskCreation { status } => Some(TaskForm::for_new(*status)),
                    DialogType::TaskEdit(task) => Some(TaskForm::for_task(task)),
                    _ => None,
                };
                self.dialog_type = Some(dialog_type);
                Action::None
            }
            Action::HideDialog => {
                self.clear_dialog();
                Action::HideDialog
            }
            Action::Dictation { field, ref event } => {
                if let Some(form) = self.task_form.as_mut() {
                    form.apply_dictation(field, event.clone());
                }
                if *event == DictationEvent::Stopped {
                    self.set_dictating(None);
                }
                action
            }
            _ => action,
        }
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        let Some(dialog_type) = self.dialog_type.clone() else {
            return;
        };

        match dialog_type {
            DialogType::TaskCreation { .. } | DialogType::TaskEdit(_) => {
                if let Some(form) = &self.task_form {
                    task_dialogs::render_task_form_dialog(f, rect, form);
                }
            }
            DialogType::DeleteConfirmation { title, .. } => {
                system_dialogs::render_delete_confirmation_dialog(f, rect, &title);
            }
            DialogType::Error(message) => {
                system_dialogs::render_message_dialog(f, rect, &message, true, &mut self.scroll);
            }
            DialogType::Info(message) => {
                system_dialogs::render_message_dialog(f, rect, &message, false, &mut self.scroll);
            }
            DialogType::Help => system_dialogs::render_help_dialog(f, rect, &mut self.scroll),
            DialogType::Logs => system_dialogs::render_logs_dialog(f, rect, &self.logs, &mut self.scroll),
        }
    }
}
