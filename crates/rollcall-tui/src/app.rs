// Application orchestrator.
//
// `AppState` owns the roster and both engines. The `run` loop is the only
// place they are mutated: it selects over engine events (animation ticks,
// partition pacing, naming results) and user commands from the TUI, and
// pushes a fresh `AppSnapshot` to the TUI after every change.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rollcall_core::config::Config;
use rollcall_core::draw::{DrawEngine, DrawError, TickOutcome};
use rollcall_core::export::{self, ExportError};
use rollcall_core::naming::NamingService;
use rollcall_core::partition::PartitionEngine;
use rollcall_core::protocol::EngineEvent;
use rollcall_core::roster::Roster;
use rollcall_core::{default_rng, DynRng};

use crate::protocol::{AppSnapshot, DrawSnapshot, Notice, PartitionSnapshot, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub roster: Roster,
    pub draw: DrawEngine,
    pub partition: PartitionEngine,
    naming_enabled: bool,
}

impl AppState {
    /// Build the state with OS-seeded randomness.
    pub fn new(
        config: Config,
        naming: Arc<dyn NamingService>,
        naming_enabled: bool,
        engine_tx: mpsc::Sender<EngineEvent>,
    ) -> Self {
        Self::with_rngs(
            config,
            naming,
            naming_enabled,
            engine_tx,
            default_rng(),
            default_rng(),
        )
    }

    pub fn with_rngs(
        config: Config,
        naming: Arc<dyn NamingService>,
        naming_enabled: bool,
        engine_tx: mpsc::Sender<EngineEvent>,
        draw_rng: DynRng,
        partition_rng: DynRng,
    ) -> Self {
        let draw = DrawEngine::new(config.draw.clone(), engine_tx.clone(), draw_rng);
        let partition = PartitionEngine::new(
            &config.partition,
            config.naming.timeout(),
            naming,
            engine_tx,
            partition_rng,
        );
        AppState {
            config,
            roster: Roster::new(),
            draw,
            partition,
            naming_enabled,
        }
    }

    /// Build a full snapshot for the TUI.
    pub fn build_snapshot(&self) -> AppSnapshot {
        let participants = self.roster.participants();
        AppSnapshot {
            participants: participants.to_vec(),
            duplicate_names: self.roster.duplicate_names().into_iter().collect(),
            draw: DrawSnapshot {
                is_rolling: self.draw.is_rolling(),
                rolling_name: if self.draw.is_rolling() {
                    self.draw.rolling_name(participants).map(str::to_string)
                } else {
                    None
                },
                winner: self.draw.winner().cloned(),
                history: self.draw.history().to_vec(),
                allow_duplicates: self.draw.duplicates_allowed(),
                pool_size: self.draw.eligible_pool(participants).len(),
            },
            partition: PartitionSnapshot {
                group_size: self.partition.group_size(),
                predicted_groups: self.partition.predicted_group_count(participants.len()),
                is_generating: self.partition.is_generating(),
                groups: self.partition.groups().to_vec(),
                naming_enabled: self.naming_enabled,
            },
        }
    }

    /// Abort every pending tick and naming request.
    pub fn cancel_background_tasks(&mut self) {
        self.draw.cancel();
        self.partition.cancel();
        debug!("Cancelled pending engine tasks");
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the orchestrator until the TUI sends `Quit` or closes its channel.
pub async fn run(
    mut engine_rx: mpsc::Receiver<EngineEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            // --- Engine events ---
            event = engine_rx.recv() => {
                match event {
                    Some(event) => handle_engine_event(&mut state, event, &ui_tx).await,
                    // The engines hold senders, so this only happens at teardown.
                    None => break,
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut state, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.cancel_background_tasks();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
        .await;
}

async fn send_notice(ui_tx: &mpsc::Sender<UiUpdate>, notice: Notice) {
    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
}

/// Route an engine event to its engine. Stale events are dropped by the
/// engines themselves and produce no snapshot.
async fn handle_engine_event(
    state: &mut AppState,
    event: EngineEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let changed = match event {
        EngineEvent::DrawTick { draw_id } => {
            match state.draw.handle_tick(draw_id, state.roster.participants()) {
                TickOutcome::Ignored => false,
                TickOutcome::Rolling { .. } => true,
                TickOutcome::Settled(winner) => {
                    match winner {
                        Some(w) => info!("Draw settled on {} ({})", w.name, w.id),
                        None => info!("Draw settled with an empty pool"),
                    }
                    true
                }
            }
        }
        EngineEvent::PartitionReady { generation } => state
            .partition
            .handle_partition_ready(generation, state.roster.participants()),
        EngineEvent::NamesSuggested { generation, names } => {
            state.partition.apply_names(generation, names)
        }
    };

    if changed {
        send_snapshot(state, ui_tx).await;
    }
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::AddNames(text) => {
            let added = state.roster.add_from_text(&text);
            if added > 0 {
                send_notice(ui_tx, Notice::info(format!("Added {added} participants"))).await;
            }
        }
        UserCommand::ImportCsv(path) => {
            match state.roster.import_csv_file(Path::new(path.trim())) {
                Ok(added) => {
                    send_notice(ui_tx, Notice::info(format!("Imported {added} participants")))
                        .await;
                }
                Err(e) => {
                    warn!("CSV import failed: {}", e);
                    send_notice(ui_tx, Notice::error(format!("Import failed: {e}"))).await;
                }
            }
        }
        UserCommand::AddMockData => {
            let added = state.roster.add_mock_data();
            send_notice(ui_tx, Notice::info(format!("Added {added} sample participants"))).await;
        }
        UserCommand::RemoveDuplicates => {
            let removed = state.roster.remove_duplicate_names();
            send_notice(
                ui_tx,
                Notice::info(format!("Removed {removed} duplicate entries")),
            )
            .await;
        }
        UserCommand::RemoveParticipant(id) => {
            if !state.roster.remove(&id) {
                debug!("RemoveParticipant for unknown id {}", id);
                return;
            }
        }
        UserCommand::ClearRoster => {
            state.roster.clear();
        }
        UserCommand::StartDraw => match state.draw.start_draw(state.roster.participants()) {
            Ok(TickOutcome::Settled(Some(w))) => info!("Draw settled on {} ({})", w.name, w.id),
            Ok(_) => {}
            Err(DrawError::PoolExhausted) => {
                send_notice(
                    ui_tx,
                    Notice::warning("Everyone has been drawn. Allow repeat winners or add people."),
                )
                .await;
                return;
            }
            Err(DrawError::AlreadyRolling) => {
                debug!("StartDraw ignored, a draw is already rolling");
                return;
            }
        },
        UserCommand::ToggleDuplicates => {
            let allowed = !state.draw.duplicates_allowed();
            state.draw.set_duplicates_allowed(allowed);
            info!("Repeat winners {}", if allowed { "allowed" } else { "excluded" });
        }
        UserCommand::SetGroupSize(size) => {
            state.partition.set_group_size(size);
        }
        UserCommand::GenerateGroups => {
            if !state.partition.generate_groups(state.roster.participants()) {
                return;
            }
        }
        UserCommand::ExportCsv => {
            match export::export_groups(state.partition.groups(), &state.config.export) {
                Ok(path) => {
                    send_notice(ui_tx, Notice::info(format!("Exported to {}", path.display())))
                        .await;
                }
                Err(ExportError::NothingToExport) => {
                    send_notice(ui_tx, Notice::warning("Generate groups before exporting")).await;
                }
                Err(e) => {
                    warn!("CSV export failed: {}", e);
                    send_notice(ui_tx, Notice::error(format!("Export failed: {e}"))).await;
                }
            }
            return;
        }
        // Handled by the run loop.
        UserCommand::Quit => return,
    }

    send_snapshot(state, ui_tx).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    use rollcall_core::naming::{DisabledNaming, NamingError, NamingRequest};

    struct FixedNaming(Vec<&'static str>);

    #[async_trait]
    impl NamingService for FixedNaming {
        async fn suggest_names(
            &self,
            _request: &NamingRequest,
        ) -> Result<Vec<String>, NamingError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.draw.min_ticks = 3;
        config.draw.max_ticks = 3;
        config
    }

    fn create_test_app_state(
        naming: Arc<dyn NamingService>,
    ) -> (AppState, mpsc::Receiver<EngineEvent>) {
        let (engine_tx, engine_rx) = mpsc::channel(64);
        let state = AppState::with_rngs(
            test_config(),
            naming,
            false,
            engine_tx,
            Box::new(StdRng::seed_from_u64(1)),
            Box::new(StdRng::seed_from_u64(2)),
        );
        (state, engine_rx)
    }

    /// Pull the next snapshot, skipping notices.
    async fn next_snapshot(ui_rx: &mut mpsc::Receiver<UiUpdate>) -> AppSnapshot {
        loop {
            match ui_rx.recv().await.unwrap() {
                UiUpdate::Snapshot(s) => return *s,
                UiUpdate::Notice(_) => continue,
            }
        }
    }

    async fn next_notice(ui_rx: &mut mpsc::Receiver<UiUpdate>) -> Notice {
        loop {
            match ui_rx.recv().await.unwrap() {
                UiUpdate::Notice(n) => return n,
                UiUpdate::Snapshot(_) => continue,
            }
        }
    }

    #[tokio::test]
    async fn add_names_updates_snapshot_and_notifies() {
        let (mut state, _engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::AddNames("Ann\nBo\nAnn".into()), &ui_tx)
            .await;

        let notice = next_notice(&mut ui_rx).await;
        assert_eq!(notice, Notice::info("Added 3 participants"));
        let snapshot = next_snapshot(&mut ui_rx).await;
        assert_eq!(snapshot.participants.len(), 3);
        assert_eq!(snapshot.duplicate_names, vec!["Ann".to_string()]);
        assert_eq!(snapshot.draw.pool_size, 3);
    }

    #[tokio::test]
    async fn remove_duplicates_keeps_first_entries() {
        let (mut state, _engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        state.roster.add_from_text("Ann\nBo\nAnn");

        handle_user_command(&mut state, UserCommand::RemoveDuplicates, &ui_tx).await;

        let snapshot = next_snapshot(&mut ui_rx).await;
        let names: Vec<&str> = snapshot.participants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Bo"]);
        assert!(snapshot.duplicate_names.is_empty());
    }

    #[tokio::test]
    async fn import_missing_file_reports_error() {
        let (mut state, _engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(
            &mut state,
            UserCommand::ImportCsv("/no/such/roster.csv".into()),
            &ui_tx,
        )
        .await;

        let notice = next_notice(&mut ui_rx).await;
        assert_eq!(notice.level, crate::protocol::NoticeLevel::Error);
        assert!(state.roster.is_empty());
    }

    #[tokio::test]
    async fn import_csv_from_file() {
        let (mut state, _engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("people.csv");
        std::fs::write(&path, "姓名\n王小明\n陳美玲\n").unwrap();

        handle_user_command(
            &mut state,
            UserCommand::ImportCsv(path.display().to_string()),
            &ui_tx,
        )
        .await;

        assert_eq!(next_notice(&mut ui_rx).await, Notice::info("Imported 2 participants"));
        assert_eq!(state.roster.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn draw_runs_to_completion_through_engine_events() {
        let (mut state, mut engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        state.roster.add_from_text("Ann\nBo");

        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;
        let snapshot = next_snapshot(&mut ui_rx).await;
        assert!(snapshot.draw.is_rolling);
        assert!(snapshot.draw.rolling_name.is_some());

        // Three ticks in total: one ran at start, two more arrive as events.
        for _ in 0..2 {
            let event = engine_rx.recv().await.unwrap();
            handle_engine_event(&mut state, event, &ui_tx).await;
        }

        let snapshot = next_snapshot(&mut ui_rx).await;
        let snapshot = if snapshot.draw.is_rolling {
            next_snapshot(&mut ui_rx).await
        } else {
            snapshot
        };
        assert!(!snapshot.draw.is_rolling);
        assert!(snapshot.draw.winner.is_some());
        assert_eq!(snapshot.draw.history.len(), 1);
        assert_eq!(snapshot.draw.pool_size, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_pool_sends_warning_and_no_snapshot() {
        let (mut state, mut engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        state.roster.add_from_text("Ann");

        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;
        while state.draw.is_rolling() {
            let event = engine_rx.recv().await.unwrap();
            handle_engine_event(&mut state, event, &ui_tx).await;
        }
        while ui_rx.try_recv().is_ok() {}

        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;
        let update = ui_rx.try_recv().unwrap();
        match update {
            UiUpdate::Notice(n) => assert_eq!(n.level, crate::protocol::NoticeLevel::Warning),
            other => panic!("expected notice, got {other:?}"),
        }
        assert!(ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn toggle_duplicates_flips_flag() {
        let (mut state, _engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::ToggleDuplicates, &ui_tx).await;
        assert!(next_snapshot(&mut ui_rx).await.draw.allow_duplicates);

        handle_user_command(&mut state, UserCommand::ToggleDuplicates, &ui_tx).await;
        assert!(!next_snapshot(&mut ui_rx).await.draw.allow_duplicates);
    }

    #[tokio::test(start_paused = true)]
    async fn generate_groups_publishes_and_applies_names() {
        let naming = Arc::new(FixedNaming(vec!["Owls", "Foxes", "Bears"]));
        let (mut state, mut engine_rx) = create_test_app_state(naming);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        state.roster.add_from_text("A\nB\nC\nD\nE");

        handle_user_command(&mut state, UserCommand::SetGroupSize(2), &ui_tx).await;
        assert_eq!(next_snapshot(&mut ui_rx).await.partition.predicted_groups, 3);

        handle_user_command(&mut state, UserCommand::GenerateGroups, &ui_tx).await;
        assert!(next_snapshot(&mut ui_rx).await.partition.is_generating);

        // PartitionReady, then NamesSuggested.
        for _ in 0..2 {
            let event = engine_rx.recv().await.unwrap();
            handle_engine_event(&mut state, event, &ui_tx).await;
        }

        let published = next_snapshot(&mut ui_rx).await;
        assert!(!published.partition.is_generating);
        assert_eq!(published.partition.groups[0].name, "Group 1");

        let named = next_snapshot(&mut ui_rx).await;
        let names: Vec<&str> = named.partition.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Owls", "Foxes", "Bears"]);
    }

    #[tokio::test]
    async fn generate_with_empty_roster_sends_nothing() {
        let (mut state, _engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::GenerateGroups, &ui_tx).await;
        assert!(ui_rx.try_recv().is_err());
        assert!(!state.partition.is_generating());
    }

    #[tokio::test]
    async fn export_without_groups_warns() {
        let (mut state, _engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::ExportCsv, &ui_tx).await;
        assert_eq!(
            next_notice(&mut ui_rx).await,
            Notice::warning("Generate groups before exporting")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn export_writes_into_configured_dir() {
        let (mut state, mut engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let tmp = tempfile::tempdir().unwrap();
        state.config.export.dir = tmp.path().display().to_string();
        state.roster.add_from_text("A\nB\nC");

        handle_user_command(&mut state, UserCommand::GenerateGroups, &ui_tx).await;
        let event = engine_rx.recv().await.unwrap();
        handle_engine_event(&mut state, event, &ui_tx).await;

        handle_user_command(&mut state, UserCommand::ExportCsv, &ui_tx).await;
        let notice = next_notice(&mut ui_rx).await;
        assert!(notice.message.starts_with("Exported to "), "got {notice:?}");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_exits_on_quit_and_cancels_pending_tick() {
        let (mut state, engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        state.roster.add_from_text("Ann\nBo");
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(256);

        let handle = tokio::spawn(run(engine_rx, cmd_rx, ui_tx, state));

        cmd_tx.send(UserCommand::StartDraw).await.unwrap();
        cmd_tx.send(UserCommand::Quit).await.unwrap();

        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok(), "run loop should exit promptly on Quit");

        // Initial snapshot plus the one after StartDraw; nothing after teardown.
        let mut snapshots = 0;
        while let Ok(update) = ui_rx.try_recv() {
            if matches!(update, UiUpdate::Snapshot(_)) {
                snapshots += 1;
            }
        }
        assert_eq!(snapshots, 2);
    }

    #[tokio::test]
    async fn run_loop_exits_when_command_channel_closes() {
        let (state, engine_rx) = create_test_app_state(Arc::new(DisabledNaming));
        let (cmd_tx, cmd_rx) = mpsc::channel::<UserCommand>(16);
        let (ui_tx, _ui_rx) = mpsc::channel(16);

        drop(cmd_tx);
        let result = run(engine_rx, cmd_rx, ui_tx, state).await;
        assert!(result.is_ok());
    }
}
