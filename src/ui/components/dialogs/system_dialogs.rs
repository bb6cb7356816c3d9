use super::common::{create_dialog_block, create_instructions_paragraph, shortcuts, DialogScroll};
use crate::constants::DIALOG_TITLE_DEBUG_LOGS;
use crate::ui::layout::LayoutManager;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const HELP_TEXT: &str = r"
NAVIGATION
----------
j/k, ↑/↓    Select task
J/K         Switch list (Pending / In Progress / Completed)
1/2/3       Jump to Pending / In Progress / Completed
Esc         Close dialog

TASKS
-----
a           Add a task to the current list
e           Edit selected task
s           Start task (move to In Progress)
c           Mark task completed
p           Move task back to Pending
d           Delete task (with confirmation)

TASK FORM
---------
Tab         Next field
Shift+Tab   Previous field
←/→         Change status (on the Status field)
Ctrl+D      Start or stop dictation (Title and Description)
Enter       Save
Esc         Cancel

SESSION
-------
r           Refresh all lists
L           Sign out
G           Show logs
?           Toggle this help
q, Ctrl+C   Quit
";

pub fn render_delete_confirmation_dialog(f: &mut Frame, area: Rect, task_title: &str) {
    let dialog_area = LayoutManager::centered_rect_lines(50, 7, area);
    f.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("⚠️  Confirm Delete")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red));
    let inner = block.inner(dialog_area);
    f.render_widget(block, dialog_area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(2), Constraint::Length(1)])
        .split(inner.inner(Margin {
            horizontal: 1,
            vertical: 0,
        }));

    let preview = if task_title.chars().count() > 40 {
        format!("\"{}...\"", task_title.chars().take(37).collect::<String>())
    } else {
        format!("\"{}\"", task_title)
    };

    f.render_widget(
        Paragraph::new("Delete this task? This cannot be undone.")
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(preview)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center),
        chunks[1],
    );
    f.render_widget(
        create_instructions_paragraph(&[
            ("Enter/y", Color::Red, " Delete"),
            shortcuts::SEPARATOR,
            shortcuts::ESC_CANCEL,
        ]),
        chunks[2],
    );
}

/// Error or info message box
pub fn render_message_dialog(f: &mut Frame, area: Rect, message: &str, is_error: bool, scroll: &mut DialogScroll) {
    let dialog_area = LayoutManager::centered_rect_lines(60, 10, area);
    f.render_widget(Clear, dialog_area);

    let (title, color) = if is_error {
        ("❌ Error", Color::Red)
    } else {
        ("ℹ️  Info", Color::Blue)
    };
    let block = create_dialog_block(title, color);
    let inner = block.inner(dialog_area);
    f.render_widget(block, dialog_area);

    let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(inner);
    let lines: Vec<Line> = message
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(Color::White))))
        .collect();
    scroll.render_lines(f, chunks[0], lines);

    f.render_widget(
        Paragraph::new("Press any key to continue • j/k to scroll if needed")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[1],
    );
}

pub fn render_help_dialog(f: &mut Frame, area: Rect, scroll: &mut DialogScroll) {
    let help_area = LayoutManager::centered_rect(80, 90, area);
    f.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("📖 Help - Press 'Esc' or '?' to close")
        .title_alignment(Alignment::Center);
    let inner = block.inner(help_area).inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    f.render_widget(block, help_area);

    let lines: Vec<Line> = HELP_TEXT.lines().map(Line::from).collect();
    scroll.render_lines(f, inner, lines);
}

/// Log viewer; `logs` are newest first
pub fn render_logs_dialog(f: &mut Frame, area: Rect, logs: &[String], scroll: &mut DialogScroll) {
    let logs_area = LayoutManager::centered_rect(90, 90, area);
    f.render_widget(Clear, logs_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(DIALOG_TITLE_DEBUG_LOGS)
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(logs_area);
    f.render_widget(block, logs_area);

    if logs.is_empty() {
        f.render_widget(
            Paragraph::new("No logs yet")
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = logs.iter().map(|entry| log_line(entry)).collect();
    scroll.render_lines(f, inner, lines);
}

/// Split `[timestamp] message` and colour the message by its marker
fn log_line(entry: &str) -> Line<'_> {
    let Some(bracket_end) = entry.find("] ") else {
        return Line::from(entry);
    };
    let (timestamp, message) = (&entry[..=bracket_end], &entry[bracket_end + 2..]);

    let color = if message.contains('❌') || message.contains("failed") || message.contains("Failed") {
        Color::Red
    } else if message.contains('✅') {
        Color::Green
    } else if message.contains("⚠️") || message.contains("↩️") {
        Color::Yellow
    } else if message.contains('🔄') {
        Color::Cyan
    } else {
        Color::White
    };

    Line::from(vec![
        Span::styled(format!("{} ", timestamp), Style::default().fg(Color::DarkGray)),
        Span::styled(message, Style::default().fg(color)),
    ])
}
