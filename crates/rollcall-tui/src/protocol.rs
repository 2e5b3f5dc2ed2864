// Messages exchanged between the app orchestrator and the TUI.
//
// The TUI sends `UserCommand`s; the orchestrator answers with `UiUpdate`s
// carrying a full `AppSnapshot` or a one-line `Notice`.

use rollcall_core::participant::{Group, Participant};

/// Dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    List,
    Draw,
    Group,
}

impl TabId {
    pub const ALL: [TabId; 3] = [TabId::List, TabId::Draw, TabId::Group];

    /// Draw and Group need at least one participant.
    pub fn requires_roster(self) -> bool {
        !matches!(self, TabId::List)
    }
}

/// Commands from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Add one participant per non-blank line.
    AddNames(String),
    /// Import names from the CSV file at this path.
    ImportCsv(String),
    AddMockData,
    RemoveDuplicates,
    /// Remove the participant with this id.
    RemoveParticipant(String),
    ClearRoster,
    StartDraw,
    ToggleDuplicates,
    SetGroupSize(usize),
    GenerateGroups,
    ExportCsv,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One-line message shown above the help bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Updates from the app orchestrator to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
    Notice(Notice),
}

/// Drawing state as the dashboard shows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawSnapshot {
    pub is_rolling: bool,
    /// Name under the cursor while rolling.
    pub rolling_name: Option<String>,
    /// Most recent winner, once a draw settles.
    pub winner: Option<Participant>,
    /// Winners, most recent first.
    pub history: Vec<Participant>,
    pub allow_duplicates: bool,
    /// How many participants the next draw can pick from.
    pub pool_size: usize,
}

/// Partition state as the dashboard shows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionSnapshot {
    pub group_size: usize,
    pub predicted_groups: usize,
    pub is_generating: bool,
    pub groups: Vec<Group>,
    /// Whether creative names can be requested.
    pub naming_enabled: bool,
}

/// Full application state pushed to the TUI after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSnapshot {
    pub participants: Vec<Participant>,
    /// Names that appear more than once, sorted.
    pub duplicate_names: Vec<String>,
    pub draw: DrawSnapshot,
    pub partition: PartitionSnapshot,
}
