use super::common::{create_dialog_block, create_input_paragraph, create_instructions_paragraph, shortcuts};
use crate::backend::TaskStatus;
use crate::ui::components::task_form::TaskForm;
use crate::ui::core::FormField;
use crate::ui::layout::LayoutManager;
use ratatui::{
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

const FORM_HEIGHT: u16 = 19;

fn render_field(f: &mut Frame, area: Rect, form: &TaskForm, field: FormField) {
    let value = form.input(field).map(|input| input.value()).unwrap_or_default();
    let mut title = field.label().to_string();
    if form.dictating == Some(field) {
        title.push_str(" 🎙️");
    }
    f.render_widget(create_input_paragraph(value, &title, form.focus == field), area);
}

fn render_error(f: &mut Frame, area: Rect, error: Option<&'static str>) {
    if let Some(error) = error {
        f.render_widget(
            Paragraph::new(Span::styled(error, Style::default().fg(Color::Red))),
            area,
        );
    }
}

fn render_status_selector(f: &mut Frame, area: Rect, form: &TaskForm) {
    let focused = form.focus == FormField::Status;
    let mut spans = Vec::new();
    for status in TaskStatus::ALL {
        let style = if status == form.status {
            Style::default()
                .fg(Color::Black)
                .bg(if focused { Color::Cyan } else { Color::Gray })
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", status.label()), style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", FormField::Status.label()))
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn dictation_line(form: &TaskForm) -> Line<'_> {
    if let Some(error) = &form.dictation_error {
        return Line::from(Span::styled(format!("🎙️ {}", error), Style::default().fg(Color::Red)));
    }
    match (form.dictating, &form.dictation_preview) {
        (Some(_), Some(preview)) => Line::from(vec![
            Span::styled("🎙️ ", Style::default().fg(Color::Magenta)),
            Span::styled(
                preview.as_str(),
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            ),
        ]),
        (Some(field), None) => Line::from(Span::styled(
            format!("🎙️ Listening for {}... Ctrl+D to stop", field.label()),
            Style::default().fg(Color::Magenta),
        )),
        (None, _) => Line::default(),
    }
}

/// Add or edit form for a task
pub fn render_task_form_dialog(f: &mut Frame, area: Rect, form: &TaskForm) {
    let dialog_area = LayoutManager::centered_rect_lines(70, FORM_HEIGHT, area);
    f.render_widget(Clear, dialog_area);

    let title = if form.is_editing() { " ✏️  Edit Task " } else { " 📝 New Task " };
    let block = create_dialog_block(title, Color::Cyan);
    let inner = block.inner(dialog_area).inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    f.render_widget(block, dialog_area);

    let chunks = Layout::vertical([
        Constraint::Length(3), // Title
        Constraint::Length(1),
        Constraint::Length(3), // Description
        Constraint::Length(1),
        Constraint::Length(3), // Dates
        Constraint::Length(1),
        Constraint::Length(3), // Status
        Constraint::Length(1), // Dictation
        Constraint::Length(1), // Instructions
    ])
    .split(inner);

    render_field(f, chunks[0], form, FormField::Title);
    render_error(f, chunks[1], form.error(FormField::Title));
    render_field(f, chunks[2], form, FormField::Description);
    render_error(f, chunks[3], form.error(FormField::Description));

    let dates = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(chunks[4]);
    let date_errors = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(chunks[5]);
    render_field(f, dates[0], form, FormField::StartDate);
    render_field(f, dates[1], form, FormField::EndDate);
    render_error(f, date_errors[0], form.error(FormField::StartDate));
    render_error(f, date_errors[1], form.error(FormField::EndDate));

    render_status_selector(f, chunks[6], form);
    f.render_widget(Paragraph::new(dictation_line(form)), chunks[7]);
    f.render_widget(
        create_instructions_paragraph(&[
            shortcuts::ENTER_SAVE,
            shortcuts::SEPARATOR,
            shortcuts::TAB_NEXT,
            shortcuts::SEPARATOR,
            ("Ctrl+D", Color::Magenta, " Dictate"),
            shortcuts::SEPARATOR,
            shortcuts::ESC_CANCEL,
        ]),
        chunks[8],
    );
}
