use crate::backend::{Task, TaskStatus};
use crate::constants::{EMPTY_COMPLETED, EMPTY_IN_PROGRESS, EMPTY_PENDING};
use crate::ui::components::task_card::TaskCard;
use crate::ui::core::{
    actions::{Action, DialogType},
    Component,
};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{block::BorderType, Block, Borders, List, ListState, Paragraph, Wrap},
    Frame,
};

/// Cards for the tasks of one status
pub struct TaskListComponent {
    pub tasks: Vec<Task>,
    pub selected_index: usize,
    pub list_state: ListState,
    pub view: TaskStatus,
}

impl Default for TaskListComponent {
    fn default() -> Self {
        Self::new(TaskStatus::Pending)
    }
}

pub fn empty_message(view: TaskStatus) -> &'static str {
    match view {
        TaskStatus::Pending => EMPTY_PENDING,
        TaskStatus::InProgress => EMPTY_IN_PROGRESS,
        TaskStatus::Completed => EMPTY_COMPLETED,
    }
}

impl TaskListComponent {
    pub fn new(view: TaskStatus) -> Self {
        Self {
            tasks: Vec::new(),
            selected_index: 0,
            list_state: ListState::default(),
            view,
        }
    }

    /// Show the tasks of `view` out of `all`, keeping the selection on the same task when possible
    pub fn update_data(&mut self, all: &[Task], view: TaskStatus) {
        let selected_id = self.get_selected_task().map(|t| t.id.clone());
        let view_changed = view != self.view;

        self.view = view;
        self.tasks = all.iter().filter(|t| t.status == view).cloned().collect();

        if view_changed {
            self.selected_index = 0;
        } else if let Some(id) = selected_id {
            if let Some(index) = self.tasks.iter().position(|t| t.id == id) {
                self.selected_index = index;
            }
        }
        self.update_list_state();
    }

    fn update_list_state(&mut self) {
        if self.tasks.is_empty() {
            self.selected_index = 0;
            self.list_state.select(None);
        } else {
            if self.selected_index >= self.tasks.len() {
                self.selected_index = self.tasks.len() - 1;
            }
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn get_selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected_index)
    }

    fn with_selected(&self, f: impl FnOnce(&Task) -> Action) -> Action {
        self.get_selected_task().map(f).unwrap_or(Action::None)
    }

    fn set_status(&self, status: TaskStatus) -> Action {
        self.with_selected(|task| {
            if task.status == status {
                Action::None
            } else {
                Action::SetTaskStatus {
                    id: task.id.clone(),
                    status,
                }
            }
        })
    }

    fn block(&self) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" {} ({}) ", self.view.label(), self.tasks.len()))
            .title_style(Style::default().fg(Color::White))
            .border_style(Style::default().fg(Color::DarkGray))
    }
}

impl Component for TaskListComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Action::PreviousTask,
            KeyCode::Down | KeyCode::Char('j') => Action::NextTask,
            KeyCode::Char('a') => Action::ShowDialog(DialogType::TaskCreation { status: self.view }),
            KeyCode::Char('e') | KeyCode::Enter => {
                self.with_selected(|task| Action::ShowDialog(DialogType::TaskEdit(task.clone())))
            }
            KeyCode::Char('s') => self.set_status(TaskStatus::InProgress),
            KeyCode::Char('c') => self.set_status(TaskStatus::Completed),
            KeyCode::Char('p') => self.set_status(TaskStatus::Pending),
            KeyCode::Char('d') | KeyCode::Delete => self.with_selected(|task| {
                Action::ShowDialog(DialogType::DeleteConfirmation {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                })
            }),
            _ => Action::None,
        }
    }

    fn update(&mut self, action: Action) -> Action {
        match action {
            Action::NextTask => {
                if !self.tasks.is_empty() {
                    self.selected_index = (self.selected_index + 1) % self.tasks.len();
                    self.update_list_state();
                }
                Action::None
            }
            Action::PreviousTask => {
                if !self.tasks.is_empty() {
                    self.selected_index = if self.selected_index == 0 {
                        self.tasks.len() - 1
                    } else {
                        self.selected_index - 1
                    };
                    self.update_list_state();
                }
                Action::None
            }
            _ => action,
        }
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        if self.tasks.is_empty() {
            let empty = Paragraph::new(format!("\n{}\n\nPress 'a' to add a task.", empty_message(self.view)))
                .block(self.block())
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(empty, rect);
            return;
        }

        let today = Local::now().date_naive();
        let width = rect.width.saturating_sub(2) as usize;
        let items: Vec<_> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| TaskCard::new(task, today).render(index == self.selected_index, width))
            .collect();

        let list = List::new(items)
            .block(self.block())
            .highlight_style(Style::default().bg(Color::Rgb(30, 30, 40)));

        f.render_stateful_widget(list, rect, &mut self.list_state);
    }
}
