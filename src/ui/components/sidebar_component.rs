//! Navigation between the three task lists.
//!
//! One entry per [`TaskStatus`] with the number of tasks it holds. The
//! selected entry decides which list the dashboard shows.

use crate::backend::{Task, TaskStatus};
use crate::ui::core::{Action, Component};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, List, ListItem, ListState},
    Frame,
};

pub struct SidebarComponent {
    pub selection: TaskStatus,
    counts: [usize; 3],
    list_state: ListState,
}

impl Default for SidebarComponent {
    fn default() -> Self {
        Self::new(TaskStatus::Pending)
    }
}

fn index_of(status: TaskStatus) -> usize {
    TaskStatus::ALL.iter().position(|s| *s == status).unwrap_or(0)
}

fn icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "○",
        TaskStatus::InProgress => "◐",
        TaskStatus::Completed => "●",
    }
}

impl SidebarComponent {
    pub fn new(selection: TaskStatus) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(index_of(selection)));
        Self {
            selection,
            counts: [0; 3],
            list_state,
        }
    }

    /// Recount tasks per list
    pub fn update_counts(&mut self, tasks: &[Task]) {
        self.counts = [0; 3];
        for task in tasks {
            self.counts[index_of(task.status)] += 1;
        }
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.counts[index_of(status)]
    }

    fn step(&self, forward: bool) -> TaskStatus {
        let len = TaskStatus::ALL.len();
        let index = index_of(self.selection);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        TaskStatus::ALL[next]
    }
}

impl Component for SidebarComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('J') => Action::NavigateToView(self.step(true)),
            KeyCode::Char('K') => Action::NavigateToView(self.step(false)),
            KeyCode::Down if key.modifiers.contains(KeyModifiers::SHIFT) => Action::NavigateToView(self.step(true)),
            KeyCode::Up if key.modifiers.contains(KeyModifiers::SHIFT) => Action::NavigateToView(self.step(false)),
            KeyCode::Char('1') => Action::NavigateToView(TaskStatus::Pending),
            KeyCode::Char('2') => Action::NavigateToView(TaskStatus::InProgress),
            KeyCode::Char('3') => Action::NavigateToView(TaskStatus::Completed),
            _ => Action::None,
        }
    }

    fn update(&mut self, action: Action) -> Action {
        match action {
            Action::NavigateToView(status) => {
                self.selection = status;
                self.list_state.select(Some(index_of(status)));
                action
            }
            Action::DataLoaded(ref tasks) => {
                self.update_counts(tasks);
                action
            }
            _ => action,
        }
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        let items: Vec<ListItem> = TaskStatus::ALL
            .iter()
            .enumerate()
            .map(|(index, status)| {
                let selected = *status == self.selection;
                let style = if selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} {} ", index + 1, icon(*status)), style),
                    Span::styled(status.label(), style),
                    Span::styled(format!(" ({})", self.count(*status)), style.fg(if selected {
                        Color::Black
                    } else {
                        Color::DarkGray
                    })),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("Lists")
                .title_style(Style::default().fg(Color::White))
                .border_style(Style::default().fg(Color::DarkGray)),
        );

        f.render_stateful_widget(list, rect, &mut self.list_state);
    }
}
