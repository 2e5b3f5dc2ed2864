// Drawing engine: animated single-winner draw with optional
// duplicate-exclusion.
//
// A draw is a small state machine, `Idle -> Rolling -> Settled`. While
// rolling, each tick picks a random roster index for display and schedules
// the next tick with a slightly longer delay. The final tick settles the
// draw by picking the winner from the eligible pool *as it is at that
// moment*. Ticks arrive as `EngineEvent::DrawTick` on the owner's event
// channel and are matched against the current draw id, so a tick from an
// earlier or cancelled draw never mutates state.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::DrawConfig;
use crate::participant::Participant;
use crate::protocol::EngineEvent;
use crate::timer::ScheduledTick;
use crate::DynRng;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    /// No draw has run yet, or the pending draw was cancelled.
    Idle,
    /// Animation in progress. `tick` ticks of `total_ticks` have run; the
    /// next one is due after `delay`.
    Rolling {
        draw_id: u64,
        tick: u32,
        total_ticks: u32,
        delay: Duration,
    },
    /// The last draw finished (with or without a winner).
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("a draw is already in progress")]
    AlreadyRolling,

    #[error("every participant has already been drawn")]
    PoolExhausted,
}

/// Result of running one animation tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick did not belong to the current draw.
    Ignored,
    /// The animation moved on to roster index `index`.
    Rolling { index: usize },
    /// The draw finished. `None` when the pool emptied during the animation.
    Settled(Option<Participant>),
}

// ---------------------------------------------------------------------------
// DrawEngine
// ---------------------------------------------------------------------------

pub struct DrawEngine {
    timing: DrawConfig,
    duplicates_allowed: bool,
    /// Every committed winner, newest first.
    history: Vec<Participant>,
    /// Winner of the last settled draw. Cleared when a new draw starts.
    winner: Option<Participant>,
    /// Roster index currently shown by the animation.
    rolling_index: usize,
    phase: DrawPhase,
    next_draw_id: u64,
    /// The next animation tick. Dropping the engine drops this handle,
    /// which aborts the tick before it can fire.
    pending_tick: Option<ScheduledTick>,
    events: mpsc::Sender<EngineEvent>,
    rng: DynRng,
}

impl DrawEngine {
    pub fn new(timing: DrawConfig, events: mpsc::Sender<EngineEvent>, rng: DynRng) -> Self {
        DrawEngine {
            duplicates_allowed: timing.allow_duplicates,
            timing,
            history: Vec::new(),
            winner: None,
            rolling_index: 0,
            phase: DrawPhase::Idle,
            next_draw_id: 0,
            pending_tick: None,
            events,
            rng,
        }
    }

    pub fn duplicates_allowed(&self) -> bool {
        self.duplicates_allowed
    }

    /// Takes effect on the next start or finish; history is left as is.
    pub fn set_duplicates_allowed(&mut self, allowed: bool) {
        self.duplicates_allowed = allowed;
    }

    pub fn history(&self) -> &[Participant] {
        &self.history
    }

    pub fn winner(&self) -> Option<&Participant> {
        self.winner.as_ref()
    }

    pub fn rolling_index(&self) -> usize {
        self.rolling_index
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self.phase, DrawPhase::Rolling { .. })
    }

    /// Name currently shown by the animation, if the index is still valid.
    pub fn rolling_name<'a>(&self, roster: &'a [Participant]) -> Option<&'a str> {
        roster.get(self.rolling_index).map(|p| p.name.as_str())
    }

    /// Participants the next draw may select.
    ///
    /// With duplicates allowed this is the whole roster; otherwise it is the
    /// roster minus everyone whose id is already in the history.
    pub fn eligible_pool<'a>(&self, roster: &'a [Participant]) -> Vec<&'a Participant> {
        if self.duplicates_allowed {
            return roster.iter().collect();
        }
        let drawn: HashSet<&str> = self.history.iter().map(|p| p.id.as_str()).collect();
        roster
            .iter()
            .filter(|p| !drawn.contains(p.id.as_str()))
            .collect()
    }

    /// Start a new draw.
    ///
    /// Fails without touching any state if a draw is already rolling or the
    /// eligible pool is empty. Otherwise clears the displayed winner, runs
    /// the first animation tick immediately and schedules the rest.
    pub fn start_draw(&mut self, roster: &[Participant]) -> Result<TickOutcome, DrawError> {
        if self.is_rolling() {
            return Err(DrawError::AlreadyRolling);
        }
        if self.eligible_pool(roster).is_empty() {
            return Err(DrawError::PoolExhausted);
        }

        self.next_draw_id += 1;
        let draw_id = self.next_draw_id;
        let total_ticks = self
            .rng
            .random_range(self.timing.min_ticks..=self.timing.max_ticks);

        self.winner = None;
        self.phase = DrawPhase::Rolling {
            draw_id,
            tick: 0,
            total_ticks,
            delay: self.timing.initial_delay(),
        };
        info!(
            "Starting draw {} ({} ticks, duplicates allowed: {})",
            draw_id, total_ticks, self.duplicates_allowed
        );

        Ok(self.advance(roster))
    }

    /// Run the animation tick of `draw_id`.
    ///
    /// Ticks that don't belong to the rolling draw are ignored.
    pub fn handle_tick(&mut self, draw_id: u64, roster: &[Participant]) -> TickOutcome {
        match self.phase {
            DrawPhase::Rolling { draw_id: current, .. } if current == draw_id => {
                self.advance(roster)
            }
            _ => {
                debug!("Discarding stale draw tick (draw {})", draw_id);
                TickOutcome::Ignored
            }
        }
    }

    /// Abort any pending tick and return to `Idle` if a draw was rolling.
    pub fn cancel(&mut self) {
        if let Some(tick) = self.pending_tick.take() {
            tick.cancel();
        }
        if self.is_rolling() {
            info!("Cancelled rolling draw");
            self.phase = DrawPhase::Idle;
        }
    }

    fn advance(&mut self, roster: &[Participant]) -> TickOutcome {
        let DrawPhase::Rolling {
            draw_id,
            tick,
            total_ticks,
            delay,
        } = self.phase
        else {
            return TickOutcome::Ignored;
        };

        // Display only: spans the full roster, not the eligible pool.
        if !roster.is_empty() {
            self.rolling_index = self.rng.random_range(0..roster.len());
        }

        let tick = tick + 1;
        if tick < total_ticks {
            let delay = delay + self.timing.delay_step();
            self.phase = DrawPhase::Rolling {
                draw_id,
                tick,
                total_ticks,
                delay,
            };
            self.pending_tick = Some(ScheduledTick::spawn(
                delay,
                self.events.clone(),
                EngineEvent::DrawTick { draw_id },
            ));
            debug!(draw_id, tick, ?delay, "draw tick");
            TickOutcome::Rolling {
                index: self.rolling_index,
            }
        } else {
            self.pending_tick = None;
            TickOutcome::Settled(self.finish_draw(roster))
        }
    }

    /// Commit the winner using the pool as it is now.
    fn finish_draw(&mut self, roster: &[Participant]) -> Option<Participant> {
        self.phase = DrawPhase::Settled;

        let pool = self.eligible_pool(roster);
        if pool.is_empty() {
            info!("Draw settled with an empty pool; no winner");
            return None;
        }

        let winner = pool[self.rng.random_range(0..pool.len())].clone();
        info!("Draw winner: {} ({})", winner.name, winner.id);
        self.history.insert(0, winner.clone());
        self.winner = Some(winner.clone());
        Some(winner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
