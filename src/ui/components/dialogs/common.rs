use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Creates a styled main dialog block
pub fn create_dialog_block<'a>(title: &'a str, theme_color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .title_style(Style::default().fg(theme_color).add_modifier(Modifier::BOLD))
        .style(Style::default().fg(theme_color))
}

/// Creates an input field block; the focused field shows a cursor block
pub fn create_input_paragraph<'a>(value: &str, field_title: &str, focused: bool) -> Paragraph<'a> {
    let (display, border) = if focused {
        (format!("{}█", value), Color::Cyan)
    } else {
        (value.to_string(), Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", field_title))
        .title_style(Style::default().fg(Color::White))
        .border_style(Style::default().fg(border));

    Paragraph::new(display)
        .block(input_block)
        .style(Style::default().fg(Color::White))
}

/// Instruction shortcut definition: (key, color, description)
pub type InstructionShortcut = (&'static str, Color, &'static str);

/// Creates a paragraph with color-coded instruction shortcuts
pub fn create_instructions_paragraph<'a>(instructions: &[InstructionShortcut]) -> Paragraph<'a> {
    let mut instruction_text = Vec::new();
    for (key, color, desc) in instructions {
        instruction_text.push(Span::styled(
            *key,
            Style::default().fg(*color).add_modifier(Modifier::BOLD),
        ));
        instruction_text.push(Span::styled(*desc, Style::default().fg(Color::Gray)));
    }

    Paragraph::new(Line::from(instruction_text)).alignment(Alignment::Center)
}

const PAGE_LINES: usize = 10;

/// Scroll position of a long dialog body
#[derive(Debug, Default)]
pub struct DialogScroll {
    offset: usize,
    scrollbar_state: ScrollbarState,
}

impl DialogScroll {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a scrolling key; returns whether the key was consumed.
    ///
    /// The offset may run past the end; rendering clamps it to the last page.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.offset = match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.offset.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.offset.saturating_add(1),
            KeyCode::PageUp => self.offset.saturating_sub(PAGE_LINES),
            KeyCode::PageDown => self.offset.saturating_add(PAGE_LINES),
            KeyCode::Home => 0,
            KeyCode::End => usize::MAX,
            _ => return false,
        };
        true
    }

    /// Render `lines` from the current offset, with a scrollbar when they overflow `area`
    pub fn render_lines(&mut self, f: &mut Frame, area: Rect, lines: Vec<Line<'_>>) {
        let total_lines = lines.len();
        let visible_height = area.height as usize;
        let max_scroll = total_lines.saturating_sub(visible_height);
        self.offset = self.offset.min(max_scroll);

        self.scrollbar_state = self
            .scrollbar_state
            .content_length(total_lines)
            .viewport_content_length(visible_height)
            .position(self.offset);

        let visible: Vec<Line> = lines.into_iter().skip(self.offset).take(visible_height).collect();
        f.render_widget(Paragraph::new(visible), area);

        if total_lines > visible_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("▐")
                .style(Style::default().fg(Color::Gray))
                .thumb_style(Style::default().fg(Color::White));

            f.render_stateful_widget(scrollbar, area, &mut self.scrollbar_state);
        }
    }
}

/// Common instruction shortcuts used across dialogs
pub mod shortcuts {
    use super::*;

    pub const SEPARATOR: InstructionShortcut = (" • ", Color::Gray, "");
    pub const ESC_CANCEL: InstructionShortcut = ("Esc", Color::Red, " Cancel");
    pub const ENTER_SAVE: InstructionShortcut = ("Enter", Color::Green, " Save");
    pub const TAB_NEXT: InstructionShortcut = ("Tab", Color::Cyan, " Next field");
}
