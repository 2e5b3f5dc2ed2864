// Library root for the rollcall dashboard.
//
// Exposes the orchestrator and TUI modules so integration tests can drive
// the app loop directly.

pub mod app;
pub mod protocol;
pub mod tui;
