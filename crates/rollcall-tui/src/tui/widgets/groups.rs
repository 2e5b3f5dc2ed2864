// Group tab: partition controls and the generated groups.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use rollcall_core::participant::Group;

use crate::protocol::PartitionSnapshot;
use crate::tui::ViewState;

/// Width of one group card, borders included.
const CARD_WIDTH: u16 = 26;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let [header, body] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let population = state.snapshot.participants.len();
    render_header(frame, header, &state.snapshot.partition, population);
    render_groups(frame, body, &state.snapshot.partition);
}

/// Summary line: population, size and predicted group count.
pub fn header_line(partition: &PartitionSnapshot, population: usize) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!(" {population} people  |  size ")),
        Span::styled(
            partition.group_size.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  |  {} groups", partition.predicted_groups)),
    ];
    if partition.is_generating {
        spans.push(Span::styled(
            "  |  shuffling...",
            Style::default().fg(Color::Yellow),
        ));
    }
    if !partition.naming_enabled {
        spans.push(Span::styled(
            "  |  creative names off",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn render_header(frame: &mut Frame, area: Rect, partition: &PartitionSnapshot, population: usize) {
    let paragraph = Paragraph::new(header_line(partition, population))
        .block(Block::default().borders(Borders::ALL).title("Grouping"));
    frame.render_widget(paragraph, area);
}

fn render_groups(frame: &mut Frame, area: Rect, partition: &PartitionSnapshot) {
    if partition.groups.is_empty() {
        let hint = if partition.is_generating {
            "  Shuffling..."
        } else {
            "  No groups yet. Press g to generate."
        };
        let paragraph = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    }

    let columns = cards_per_row(area.width);
    let tallest = partition
        .groups
        .iter()
        .map(|g| g.members.len())
        .max()
        .unwrap_or(0);
    let card_height = (tallest as u16).saturating_add(2);

    let rows: Vec<&[Group]> = partition.groups.chunks(columns).collect();
    let row_areas = Layout::vertical(vec![Constraint::Length(card_height); rows.len()]).split(area);

    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        if row_area.height == 0 {
            break;
        }
        let cells =
            Layout::horizontal(vec![Constraint::Length(CARD_WIDTH); columns]).split(*row_area);
        for (group, cell) in row.iter().zip(cells.iter()) {
            render_card(frame, *cell, group);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, group: &Group) {
    let lines: Vec<Line> = group
        .members
        .iter()
        .map(|m| Line::from(m.name.clone()))
        .collect();
    let title = Span::styled(
        format!("{} ({})", group.name, group.members.len()),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    );
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

/// How many cards fit side by side, at least one.
pub fn cards_per_row(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::participant::Participant;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn header_shows_size_and_prediction() {
        let partition = PartitionSnapshot {
            group_size: 4,
            predicted_groups: 3,
            naming_enabled: true,
            ..Default::default()
        };
        assert_eq!(
            line_text(&header_line(&partition, 10)),
            " 10 people  |  size 4  |  3 groups"
        );
    }

    #[test]
    fn header_flags_generation_and_disabled_naming() {
        let partition = PartitionSnapshot {
            group_size: 2,
            predicted_groups: 1,
            is_generating: true,
            naming_enabled: false,
            ..Default::default()
        };
        let text = line_text(&header_line(&partition, 2));
        assert!(text.contains("shuffling"));
        assert!(text.contains("creative names off"));
    }

    #[test]
    fn cards_per_row_never_zero() {
        assert_eq!(cards_per_row(10), 1);
        assert_eq!(cards_per_row(CARD_WIDTH * 3 + 5), 3);
    }

    #[test]
    fn renders_group_cards() {
        let mut state = ViewState::default();
        state.snapshot.partition.groups = vec![
            Group {
                id: "group-1-0".into(),
                name: "Red Pandas".into(),
                members: vec![Participant::new("p-0", "Ann"), Participant::new("p-1", "Bo")],
            },
            Group {
                id: "group-1-1".into(),
                name: "Group 2".into(),
                members: vec![Participant::new("p-2", "Cy")],
            },
        ];
        let backend = ratatui::backend::TestBackend::new(80, 16);
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
        assert!(text.contains("Red Pandas (2)"));
        assert!(text.contains("Group 2 (1)"));
        assert!(text.contains("Cy"));
    }

    #[test]
    fn many_groups_in_small_area_do_not_panic() {
        let mut state = ViewState::default();
        state.snapshot.partition.groups = (0..40)
            .map(|i| Group {
                id: format!("group-1-{i}"),
                name: format!("Group {}", i + 1),
                members: vec![Participant::new(format!("p-{i}"), "X")],
            })
            .collect();
        let backend = ratatui::backend::TestBackend::new(30, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
