// Roster widget: the participant list on the List tab.
//
// Names that occur more than once are shown in yellow. The selected row is
// highlighted and kept in view.

use std::collections::HashSet;

use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let participants = &state.snapshot.participants;
    let title = title(state);

    if participants.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from("  The roster is empty."),
            Line::from(""),
            Line::from("  a: type names   i: import a CSV file   m: sample data"),
            Line::from("  Pasting text adds one person per line."),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let duplicates: HashSet<&str> = state
        .snapshot
        .duplicate_names
        .iter()
        .map(String::as_str)
        .collect();

    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let offset = scroll_offset(state.selected, visible_rows, participants.len());

    let items: Vec<ListItem> = participants
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows)
        .map(|(i, p)| {
            let mut style = if duplicates.contains(p.name.as_str()) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            if i == state.selected {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4}  ", i + 1), Style::default().fg(Color::Gray)),
                Span::styled(p.name.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);

    if participants.len() > visible_rows {
        let mut scrollbar_state =
            ScrollbarState::new(participants.len().saturating_sub(visible_rows)).position(offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn title(state: &ViewState) -> String {
    let dup_count = state.snapshot.duplicate_names.len();
    if dup_count > 0 {
        format!(
            "Roster ({}) - {} duplicate names, d to remove",
            state.snapshot.participants.len(),
            dup_count
        )
    } else {
        format!("Roster ({})", state.snapshot.participants.len())
    }
}

/// First visible row so that `selected` stays on screen.
pub fn scroll_offset(selected: usize, visible_rows: usize, total: usize) -> usize {
    let max_offset = total.saturating_sub(visible_rows);
    selected
        .saturating_sub(visible_rows.saturating_sub(1))
        .min(max_offset)
}
