// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Main Panel (fill)                                 |
// |                                                   |
// +--------------------------------------------------+
// | Notice (1 row)                                    |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The Draw tab further splits the main panel into the stage (60%) and the
// winner history (40%).

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Tab bar and roster size.
    pub status_bar: Rect,
    /// Tab-switched content area.
    pub main_panel: Rect,
    /// Last notice or the active input prompt.
    pub notice_bar: Rect,
    /// Keyboard shortcut hints for the active tab.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(6),    // main panel
            Constraint::Length(1), // notice
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main_panel: vertical[1],
        notice_bar: vertical[2],
        help_bar: vertical[3],
    }
}

/// Split the Draw tab into (stage, history).
pub fn split_draw_panel(area: Rect) -> (Rect, Rect) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    (horizontal[0], horizontal[1])
}
