// Keyboard and paste handling.
//
// Translates crossterm events into `UserCommand`s for the app orchestrator,
// or into local `ViewState` mutations (tab switching, selection, prompts,
// confirmations).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Confirm, Prompt, PromptKind, ViewState};
use crate::protocol::{TabId, UserCommand};

/// Smallest group size the dashboard offers.
pub const MIN_DASHBOARD_GROUP_SIZE: usize = 2;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator, `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // On Windows crossterm reports both Press and Release.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if let Some(confirm) = view_state.confirm {
        return handle_confirm(key_event, view_state, confirm);
    }

    if view_state.prompt.is_some() {
        return handle_prompt(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char('1') => {
            view_state.switch_tab(TabId::List);
            None
        }
        KeyCode::Char('2') => {
            view_state.switch_tab(TabId::Draw);
            None
        }
        KeyCode::Char('3') => {
            view_state.switch_tab(TabId::Group);
            None
        }
        KeyCode::Char('q') => {
            view_state.confirm = Some(Confirm::Quit);
            None
        }
        KeyCode::Esc => {
            view_state.notice = None;
            None
        }
        _ => match view_state.active_tab {
            TabId::List => handle_list_key(key_event.code, view_state),
            TabId::Draw => handle_draw_key(key_event.code, view_state),
            TabId::Group => handle_group_key(key_event.code, view_state),
        },
    }
}

/// Handle a bracketed paste.
///
/// Inside a prompt the text goes into the buffer; on the List tab every
/// pasted line becomes a participant.
pub fn handle_paste(text: &str, view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.confirm.is_some() {
        return None;
    }

    if let Some(prompt) = view_state.prompt.as_mut() {
        match prompt.kind {
            PromptKind::AddNames => prompt.buffer.push_str(text),
            PromptKind::ImportPath => {
                let first = text.lines().next().unwrap_or("");
                prompt.buffer.push_str(first.trim().trim_matches(['\'', '"']));
            }
        }
        return None;
    }

    if view_state.active_tab == TabId::List && text.lines().any(|l| !l.trim().is_empty()) {
        return Some(UserCommand::AddNames(text.to_string()));
    }
    None
}

fn handle_confirm(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    confirm: Confirm,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.confirm = None;
            Some(match confirm {
                Confirm::Quit => UserCommand::Quit,
                Confirm::ClearRoster => UserCommand::ClearRoster,
            })
        }
        KeyCode::Char('q') | KeyCode::Char('Q') if confirm == Confirm::Quit => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm = None;
            None
        }
        _ => None, // Block all other input
    }
}

fn handle_prompt(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let prompt = view_state.prompt.as_mut()?;
    match key_event.code {
        KeyCode::Esc => {
            view_state.prompt = None;
            None
        }
        KeyCode::Enter => {
            let Prompt { kind, buffer } = view_state.prompt.take()?;
            if buffer.trim().is_empty() {
                return None;
            }
            Some(match kind {
                PromptKind::AddNames => UserCommand::AddNames(buffer),
                PromptKind::ImportPath => UserCommand::ImportCsv(buffer.trim().to_string()),
            })
        }
        KeyCode::Backspace => {
            prompt.buffer.pop();
            None
        }
        KeyCode::Char(c) => {
            prompt.buffer.push(c);
            None
        }
        _ => None,
    }
}

fn handle_list_key(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    match code {
        KeyCode::Char('a') => {
            view_state.prompt = Some(Prompt::new(PromptKind::AddNames));
            None
        }
        KeyCode::Char('i') => {
            view_state.prompt = Some(Prompt::new(PromptKind::ImportPath));
            None
        }
        KeyCode::Char('m') => Some(UserCommand::AddMockData),
        KeyCode::Char('d') => {
            if view_state.snapshot.duplicate_names.is_empty() {
                return None;
            }
            Some(UserCommand::RemoveDuplicates)
        }
        KeyCode::Char('x') | KeyCode::Delete => view_state
            .snapshot
            .participants
            .get(view_state.selected)
            .map(|p| UserCommand::RemoveParticipant(p.id.clone())),
        KeyCode::Char('C') => {
            if !view_state.roster_is_empty() {
                view_state.confirm = Some(Confirm::ClearRoster);
            }
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let last = view_state.snapshot.participants.len().saturating_sub(1);
            view_state.selected = (view_state.selected + 1).min(last);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected = view_state.selected.saturating_sub(1);
            None
        }
        KeyCode::Home => {
            view_state.selected = 0;
            None
        }
        KeyCode::End => {
            view_state.selected = view_state.snapshot.participants.len().saturating_sub(1);
            None
        }
        _ => None,
    }
}

fn handle_draw_key(code: KeyCode, view_state: &ViewState) -> Option<UserCommand> {
    match code {
        KeyCode::Char(' ') | KeyCode::Enter => {
            if view_state.snapshot.draw.is_rolling {
                return None;
            }
            Some(UserCommand::StartDraw)
        }
        KeyCode::Char('u') => Some(UserCommand::ToggleDuplicates),
        _ => None,
    }
}

fn handle_group_key(code: KeyCode, view_state: &ViewState) -> Option<UserCommand> {
    let partition = &view_state.snapshot.partition;
    let roster_len = view_state.snapshot.participants.len();
    match code {
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
            adjusted_group_size(partition.group_size, 1, roster_len).map(UserCommand::SetGroupSize)
        }
        KeyCode::Char('-') | KeyCode::Left => {
            adjusted_group_size(partition.group_size, -1, roster_len).map(UserCommand::SetGroupSize)
        }
        KeyCode::Char('g') => {
            if partition.is_generating {
                return None;
            }
            Some(UserCommand::GenerateGroups)
        }
        KeyCode::Char('e') => Some(UserCommand::ExportCsv),
        _ => None,
    }
}

/// Step `current` by `delta` within `[MIN_DASHBOARD_GROUP_SIZE, roster_len]`.
///
/// Returns `None` when the size would not change.
pub fn adjusted_group_size(current: usize, delta: i64, roster_len: usize) -> Option<usize> {
    if roster_len < MIN_DASHBOARD_GROUP_SIZE {
        return None;
    }
    let next = (current as i64 + delta)
        .clamp(MIN_DASHBOARD_GROUP_SIZE as i64, roster_len as i64) as usize;
    (next != current).then_some(next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
