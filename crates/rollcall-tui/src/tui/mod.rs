// TUI dashboard: view state, frame rendering and the terminal event loop.
//
// The TUI owns a `ViewState` holding the latest `AppSnapshot` plus purely
// local state (active tab, selection, prompts, confirmations). The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use anyhow::Context;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{AppSnapshot, Notice, TabId, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Names to add, one per line.
    AddNames,
    /// Path of a CSV file to import.
    ImportPath,
}

/// Single-line text input shown in the notice bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Prompt {
            kind,
            buffer: String::new(),
        }
    }
}

/// Actions that need a y/n confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Quit,
    ClearRoster,
}

/// TUI-local state that mirrors the application state for rendering.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Latest state pushed by the orchestrator.
    pub snapshot: AppSnapshot,
    pub active_tab: TabId,
    /// Selected row in the roster list.
    pub selected: usize,
    pub prompt: Option<Prompt>,
    pub confirm: Option<Confirm>,
    pub notice: Option<Notice>,
}

impl ViewState {
    pub fn roster_is_empty(&self) -> bool {
        self.snapshot.participants.is_empty()
    }

    /// Switch tabs unless the target needs a roster and there is none.
    pub fn switch_tab(&mut self, tab: TabId) -> bool {
        if tab.requires_roster() && self.roster_is_empty() {
            return false;
        }
        self.active_tab = tab;
        true
    }

    /// Replace the snapshot and fix up selection and tab.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        self.snapshot = snapshot;
        let len = self.snapshot.participants.len();
        self.selected = self.selected.min(len.saturating_sub(1));
        if self.active_tab.requires_roster() && len == 0 {
            self.active_tab = TabId::List;
        }
    }
}

fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
        UiUpdate::Notice(notice) => state.notice = Some(notice),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    match state.active_tab {
        TabId::List => widgets::roster::render(frame, layout.main_panel, state),
        TabId::Draw => widgets::draw::render(frame, layout.main_panel, state),
        TabId::Group => widgets::groups::render(frame, layout.main_panel, state),
    }
    widgets::notice::render(frame, layout.notice_bar, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(confirm) = state.confirm {
        widgets::confirm::render(frame, frame.area(), confirm);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop until the user quits or the orchestrator closes
/// the update channel.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableBracketedPaste)
        .context("failed to enable bracketed paste")?;

    // Restore the terminal before the default hook prints the panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App is shutting down
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                let command = match maybe_event {
                    Some(Ok(Event::Key(key_event))) => input::handle_key(key_event, &mut view_state),
                    Some(Ok(Event::Paste(text))) => input::handle_paste(&text, &mut view_state),
                    // Mouse, resize, focus
                    Some(Ok(_)) => None,
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                };
                if let Some(cmd) = command {
                    let quit = cmd == UserCommand::Quit;
                    let _ = cmd_tx.send(cmd).await;
                    if quit {
                        break Ok(());
                    }
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
