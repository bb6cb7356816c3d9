//! Add/edit task form state.

use crate::backend::{Task, TaskStatus};
use crate::speech::{merge_transcript, DictationEvent};
use crate::ui::components::text_input::TextInput;
use crate::ui::core::{Action, FormField};
use crate::utils::datetime;
use crate::validation::{validate_task_form, TaskFormErrors, TaskFormInput};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    /// Id of the task being edited; `None` when adding
    pub editing: Option<String>,
    pub title: TextInput,
    pub description: TextInput,
    pub start_date: TextInput,
    pub end_date: TextInput,
    pub status: TaskStatus,
    pub focus: FormField,
    pub errors: TaskFormErrors,
    /// Field currently receiving dictation
    pub dictating: Option<FormField>,
    pub dictation_preview: Option<String>,
    pub dictation_error: Option<String>,
}

impl TaskForm {
    pub fn for_new(status: TaskStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn for_task(task: &Task) -> Self {
        Self {
            editing: Some(task.id.clone()),
            title: TextInput::new(task.title.clone()),
            description: TextInput::new(task.description.clone()),
            start_date: TextInput::new(task.start_date.map(datetime::format_ymd).unwrap_or_default()),
            end_date: TextInput::new(task.end_date.map(datetime::format_ymd).unwrap_or_default()),
            status: task.status,
            ..Self::default()
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn input(&self, field: FormField) -> Option<&TextInput> {
        match field {
            FormField::Title => Some(&self.title),
            FormField::Description => Some(&self.description),
            FormField::StartDate => Some(&self.start_date),
            FormField::EndDate => Some(&self.end_date),
            FormField::Status => None,
        }
    }

    fn input_mut(&mut self, field: FormField) -> Option<&mut TextInput> {
        match field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::StartDate => Some(&mut self.start_date),
            FormField::EndDate => Some(&mut self.end_date),
            FormField::Status => None,
        }
    }

    pub fn error(&self, field: FormField) -> Option<&'static str> {
        match field {
            FormField::Title => self.errors.title,
            FormField::Description => self.errors.description,
            FormField::StartDate => self.errors.start_date,
            FormField::EndDate => self.errors.end_date,
            FormField::Status => None,
        }
    }

    /// Validate and turn the form into a create or update action
    pub fn submit(&mut self) -> Action {
        let input = TaskFormInput {
            title: self.title.value(),
            description: self.description.value(),
            start_date: self.start_date.value(),
            end_date: self.end_date.value(),
            status: self.status,
        };

        match validate_task_form(&input) {
            Ok(draft) => {
                self.errors = TaskFormErrors::default();
                match &self.editing {
                    Some(id) => Action::UpdateTask { id: id.clone(), draft },
                    None => Action::CreateTask(draft),
                }
            }
            Err(errors) => {
                self.errors = errors;
                Action::None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('d') {
            // A running dictation is stopped from any field
            return match self.dictating {
                Some(field) => Action::ToggleDictation(field),
                None if self.focus.accepts_dictation() => Action::ToggleDictation(self.focus),
                None => Action::None,
            };
        }

        match key.code {
            KeyCode::Esc => Action::HideDialog,
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                Action::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.previous();
                Action::None
            }
            KeyCode::Right | KeyCode::Char(' ') if self.focus == FormField::Status => {
                self.status = self.status.cycle();
                Action::None
            }
            KeyCode::Left if self.focus == FormField::Status => {
                self.status = self.status.cycle().cycle();
                Action::None
            }
            _ => {
                let focus = self.focus;
                if let Some(input) = self.input_mut(focus) {
                    input.handle_key(key);
                }
                Action::None
            }
        }
    }

    /// Fold a dictation event into the form
    pub fn apply_dictation(&mut self, field: FormField, event: DictationEvent) {
        match event {
            DictationEvent::Partial(text) => self.dictation_preview = Some(text),
            DictationEvent::Text(text) => {
                self.dictation_preview = None;
                if let Some(input) = self.input_mut(field) {
                    let merged = merge_transcript(input.value(), &text);
                    input.set(merged);
                }
            }
            DictationEvent::Error(message) => self.dictation_error = Some(message),
            DictationEvent::Stopped => {
                self.dictating = None;
                self.dictation_preview = None;
            }
        }
    }
}
