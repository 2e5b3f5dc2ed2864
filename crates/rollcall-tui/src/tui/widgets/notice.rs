// Notice bar: the active prompt, or the latest notice from the orchestrator.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::NoticeLevel;
use crate::tui::{PromptKind, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    frame.render_widget(Paragraph::new(notice_line(state)), area);
}

pub fn prompt_label(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::AddNames => "Add name: ",
        PromptKind::ImportPath => "CSV path: ",
    }
}

pub fn notice_line(state: &ViewState) -> Line<'static> {
    if let Some(prompt) = &state.prompt {
        return Line::from(vec![
            Span::styled(
                prompt_label(prompt.kind),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(prompt.buffer.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]);
    }

    match &state.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!(" {}", notice.message),
                Style::default().fg(color),
            ))
        }
        None => Line::default(),
    }
}
