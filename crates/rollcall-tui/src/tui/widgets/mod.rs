// TUI widget modules for each dashboard panel.

pub mod confirm;
pub mod draw;
pub mod groups;
pub mod help_bar;
pub mod notice;
pub mod roster;
pub mod status_bar;
