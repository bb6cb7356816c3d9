use crate::backend::{Task, TaskStatus};
use crate::constants::CARD_DESCRIPTION_LINES;
use crate::utils::datetime::{display_date, relative_to};
use chrono::NaiveDate;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

/// One task rendered as a multi-line card
pub struct TaskCard<'a> {
    pub task: &'a Task,
    pub today: NaiveDate,
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::InProgress => Color::Cyan,
        TaskStatus::Completed => Color::Green,
    }
}

/// Cut `text` to at most `width` characters, marking the cut with an ellipsis
fn truncate(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Wrap `text` on whitespace into lines of `width` characters, keeping at most `max_lines`
pub fn clamp_lines(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let shortened = truncate(last, width.saturating_sub(1));
            *last = format!("{}…", shortened.trim_end_matches('…'));
        }
    }
    lines.into_iter().map(|line| truncate(&line, width)).collect()
}

impl<'a> TaskCard<'a> {
    pub fn new(task: &'a Task, today: NaiveDate) -> Self {
        Self { task, today }
    }

    fn date_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled("Start: ", Style::default().fg(Color::DarkGray)),
            Span::styled(display_date(self.task.start_date), Style::default().fg(Color::White)),
            Span::styled("  End: ", Style::default().fg(Color::DarkGray)),
            Span::styled(display_date(self.task.end_date), Style::default().fg(Color::White)),
        ];

        if let Some(end) = self.task.end_date {
            let overdue = end < self.today && self.task.status != TaskStatus::Completed;
            let color = if overdue { Color::Red } else { Color::Rgb(255, 165, 0) };
            spans.push(Span::styled(
                format!(" ({})", relative_to(end, self.today)),
                Style::default().fg(color),
            ));
        }
        Line::from(spans)
    }

    /// Card lines for a list of the given inner width
    pub fn render(&self, selected: bool, width: usize) -> ListItem<'static> {
        let marker = if selected { "▶ " } else { "  " };
        let title_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };
        let body_width = width.saturating_sub(2);

        let mut lines = vec![Line::from(vec![
            Span::styled(marker, title_style),
            Span::styled(truncate(&self.task.title, body_width), title_style),
        ])];

        for line in clamp_lines(&self.task.description, body_width, CARD_DESCRIPTION_LINES) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(line, Style::default().fg(Color::Gray)),
            ]));
        }

        let mut dates = self.date_line();
        dates.spans.insert(0, Span::raw("  "));
        lines.push(dates);

        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("[{}]", self.task.status.label()),
                Style::default().fg(status_color(self.task.status)),
            ),
        ]));
        lines.push(Line::default());

        ListItem::new(lines)
    }
}
