//! Status bar component

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph},
    Frame,
};

const HINTS: &str = "a: add • e: edit • s/c/p: move • d: delete • r: refresh • ?: help • q: quit";

/// What the bottom line should show
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusBar<'a> {
    /// Transient feedback and whether it reports a failure
    pub message: Option<(&'a str, bool)>,
    pub syncing: bool,
    pub dictating: bool,
}

impl StatusBar<'_> {
    pub fn text(&self) -> (String, Color) {
        if let Some((message, is_error)) = self.message {
            let color = if is_error { Color::Red } else { Color::Green };
            return (message.to_string(), color);
        }
        if self.dictating {
            return ("🎙️  Listening... Ctrl+D to stop".to_string(), Color::Magenta);
        }
        if self.syncing {
            return ("🔄 Syncing tasks...".to_string(), Color::Yellow);
        }
        (HINTS.to_string(), Color::Gray)
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let (text, color) = self.text();
        let status_bar = Paragraph::new(text)
            .block(Block::default())
            .alignment(Alignment::Center)
            .style(Style::default().fg(color));

        f.render_widget(status_bar, area);
    }
}
