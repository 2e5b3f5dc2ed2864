// Help bar widget: key hints for the current context.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let key_style = Style::default().fg(Color::Yellow);
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    for (i, (key, desc)) in help_entries(state).iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", sep_style));
        }
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::raw(format!(":{desc}")));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// (key, description) pairs for the current mode.
pub fn help_entries(state: &ViewState) -> Vec<(&'static str, &'static str)> {
    if state.confirm.is_some() {
        return vec![("y", "Confirm"), ("n/Esc", "Cancel")];
    }
    if state.prompt.is_some() {
        return vec![("Enter", "Submit"), ("Esc", "Cancel"), ("Bksp", "Delete")];
    }

    let mut entries = match state.active_tab {
        TabId::List => {
            let mut entries = vec![("a", "Add"), ("i", "Import"), ("m", "Sample")];
            if !state.snapshot.duplicate_names.is_empty() {
                entries.push(("d", "Dedupe"));
            }
            if !state.roster_is_empty() {
                entries.push(("x", "Remove"));
                entries.push(("C", "Clear"));
            }
            entries
        }
        TabId::Draw => vec![("Space", "Draw"), ("u", "Repeat winners")],
        TabId::Group => vec![("+/-", "Size"), ("g", "Generate"), ("e", "Export")],
    };
    entries.push(("1-3", "Tabs"));
    entries.push(("q", "Quit"));
    entries
}
