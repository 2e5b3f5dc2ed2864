// Status bar widget: tab bar and roster size.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " rollcall ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(" "));
    spans.extend(tab_spans(state.active_tab, state.roster_is_empty()));

    spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("{} people", state.snapshot.participants.len()),
        Style::default().fg(Color::White),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Tab labels: the active one highlighted, locked ones dimmed.
/// E.g. "[1:List] [2:Draw] [3:Groups]"
pub fn tab_spans(active: TabId, roster_empty: bool) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, tab) in TabId::ALL.into_iter().enumerate() {
        let style = if tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else if tab.requires_roster() && roster_empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", i + 1, tab_label(tab)), style));
        spans.push(Span::raw(" "));
    }
    spans
}

pub fn tab_label(tab: TabId) -> &'static str {
    match tab {
        TabId::List => "List",
        TabId::Draw => "Draw",
        TabId::Group => "Groups",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_spans_contain_labels() {
        let spans = tab_spans(TabId::List, false);
        let labels: Vec<&str> = spans
            .iter()
            .step_by(2)
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(labels, vec!["[1:List]", "[2:Draw]", "[3:Groups]"]);
    }

    #[test]
    fn active_tab_is_bold() {
        let spans = tab_spans(TabId::Draw, false);
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn locked_tabs_are_dimmed() {
        let spans = tab_spans(TabId::List, true);
        assert_eq!(spans[2].style.fg, Some(Color::DarkGray));
        assert_eq!(spans[4].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
