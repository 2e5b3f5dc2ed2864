// Draw tab: the rolling name or winner on the left, the winner history
// ("Hall of Fame") on the right.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::protocol::DrawSnapshot;
use crate::tui::layout::split_draw_panel;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (stage, history) = split_draw_panel(area);
    render_stage(frame, stage, &state.snapshot.draw);
    render_history(frame, history, &state.snapshot.draw);
}

/// Text shown in the middle of the stage.
pub fn stage_text(draw: &DrawSnapshot) -> (String, Color) {
    if draw.is_rolling {
        let name = draw.rolling_name.clone().unwrap_or_else(|| "...".to_string());
        return (name, Color::Cyan);
    }
    match &draw.winner {
        Some(winner) => (winner.name.clone(), Color::Green),
        None if draw.pool_size == 0 => ("Everyone has been drawn".to_string(), Color::DarkGray),
        None => ("Press Space to draw".to_string(), Color::DarkGray),
    }
}

fn render_stage(frame: &mut Frame, area: Rect, draw: &DrawSnapshot) {
    let (text, color) = stage_text(draw);
    let pad = (area.height as usize).saturating_sub(5) / 2;

    let mut lines: Vec<Line> = std::iter::repeat_n(Line::from(""), pad).collect();
    if draw.winner.is_some() && !draw.is_rolling {
        lines.push(Line::from(Span::styled(
            "Winner",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{} eligible  |  repeat winners {}",
            draw.pool_size,
            if draw.allow_duplicates { "allowed" } else { "excluded" }
        ),
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Lucky Draw"));
    frame.render_widget(paragraph, area);
}

fn render_history(frame: &mut Frame, area: Rect, draw: &DrawSnapshot) {
    let title = format!("Hall of Fame ({})", draw.history.len());
    if draw.history.is_empty() {
        let paragraph = Paragraph::new("  No winners yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let total = draw.history.len();
    let items: Vec<ListItem> = draw
        .history
        .iter()
        .enumerate()
        .map(|(i, p)| {
            // History is newest first; number winners in draw order.
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<3} ", total - i), Style::default().fg(Color::Gray)),
                Span::raw(p.name.clone()),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::participant::Participant;

    #[test]
    fn stage_shows_rolling_name() {
        let draw = DrawSnapshot {
            is_rolling: true,
            rolling_name: Some("Ann".into()),
            pool_size: 2,
            ..Default::default()
        };
        assert_eq!(stage_text(&draw), ("Ann".to_string(), Color::Cyan));
    }

    #[test]
    fn stage_shows_winner_when_settled() {
        let draw = DrawSnapshot {
            winner: Some(Participant::new("p-1", "Bo")),
            pool_size: 1,
            ..Default::default()
        };
        assert_eq!(stage_text(&draw).0, "Bo");
    }

    #[test]
    fn stage_reports_exhausted_pool() {
        let draw = DrawSnapshot::default();
        assert_eq!(stage_text(&draw).0, "Everyone has been drawn");
    }

    #[test]
    fn history_renders_newest_first() {
        let mut state = ViewState::default();
        state.snapshot.draw.history = vec![
            Participant::new("p-2", "Second"),
            Participant::new("p-1", "First"),
        ];
        let backend = ratatui::backend::TestBackend::new(80, 12);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        let second = text.find("#2").unwrap();
        let first = text.find("#1 ").unwrap();
        assert!(second < first);
        assert!(text.contains("Hall of Fame (2)"));
    }
}
