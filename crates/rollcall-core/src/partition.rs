// Partition engine: split the roster into fixed-size groups and ask the
// naming service for creative group names.
//
// A generation runs in two asynchronous steps, each reported back as an
// `EngineEvent` tagged with the generation number:
//
// 1. `generate_groups` schedules `PartitionReady` after a short pacing delay.
// 2. `handle_partition_ready` shuffles the roster, publishes the groups with
//    placeholder names and spawns the naming request, which reports
//    `NamesSuggested` on success.
//
// Only events of the current generation are applied. Starting a new
// generation aborts the previous naming request, and any late reply is
// discarded by the generation check.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PartitionConfig;
use crate::naming::{NamingError, NamingRequest, NamingService};
use crate::participant::{placeholder_name, Group, Participant};
use crate::protocol::EngineEvent;
use crate::timer::ScheduledTick;
use crate::DynRng;

/// Smallest group size the engine accepts; anything lower is clamped.
pub const MIN_GROUP_SIZE: usize = 1;

// ---------------------------------------------------------------------------
// Pure partitioning
// ---------------------------------------------------------------------------

/// Shuffle a copy of `roster` and cut it into consecutive groups of
/// `group_size` members. The last group keeps whatever is left over.
pub fn partition_roster<R: Rng + ?Sized>(
    roster: &[Participant],
    group_size: usize,
    generation: u64,
    rng: &mut R,
) -> Vec<Group> {
    let size = group_size.max(MIN_GROUP_SIZE);
    let mut shuffled = roster.to_vec();
    shuffled.shuffle(rng);

    shuffled
        .chunks(size)
        .enumerate()
        .map(|(i, chunk)| Group {
            id: format!("group-{generation}-{i}"),
            name: placeholder_name(i),
            members: chunk.to_vec(),
        })
        .collect()
}

/// Number of groups a roster of `roster_len` splits into.
pub fn group_count(roster_len: usize, group_size: usize) -> usize {
    roster_len.div_ceil(group_size.max(MIN_GROUP_SIZE))
}

// ---------------------------------------------------------------------------
// PartitionEngine
// ---------------------------------------------------------------------------

pub struct PartitionEngine {
    group_size: usize,
    pacing_delay: Duration,
    naming_timeout: Duration,
    groups: Vec<Group>,
    is_generating: bool,
    /// Monotonically increasing id of the latest `generate_groups` call.
    generation: u64,
    pending_ready: Option<ScheduledTick>,
    naming_task: Option<JoinHandle<()>>,
    naming: Arc<dyn NamingService>,
    events: mpsc::Sender<EngineEvent>,
    rng: DynRng,
}

impl PartitionEngine {
    pub fn new(
        config: &PartitionConfig,
        naming_timeout: Duration,
        naming: Arc<dyn NamingService>,
        events: mpsc::Sender<EngineEvent>,
        rng: DynRng,
    ) -> Self {
        PartitionEngine {
            group_size: config.default_group_size.max(MIN_GROUP_SIZE),
            pacing_delay: config.pacing_delay(),
            naming_timeout,
            groups: Vec::new(),
            is_generating: false,
            generation: 0,
            pending_ready: None,
            naming_task: None,
            naming,
            events,
            rng,
        }
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Set the target group size, clamped to at least `MIN_GROUP_SIZE`.
    ///
    /// Applies to the next generation; current groups are untouched.
    pub fn set_group_size(&mut self, size: usize) {
        if size < MIN_GROUP_SIZE {
            warn!("Group size {} below minimum, clamping to {}", size, MIN_GROUP_SIZE);
        }
        self.group_size = size.max(MIN_GROUP_SIZE);
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn predicted_group_count(&self, roster_len: usize) -> usize {
        group_count(roster_len, self.group_size)
    }

    /// Start a new generation.
    ///
    /// Returns `false` (and does nothing) for an empty roster. Otherwise
    /// aborts any in-flight naming request and schedules `PartitionReady`
    /// after the pacing delay.
    pub fn generate_groups(&mut self, roster: &[Participant]) -> bool {
        if roster.is_empty() {
            debug!("generate_groups called with an empty roster, skipping");
            return false;
        }

        self.cancel_naming_task();
        self.generation += 1;
        self.is_generating = true;
        self.pending_ready = Some(ScheduledTick::spawn(
            self.pacing_delay,
            self.events.clone(),
            EngineEvent::PartitionReady {
                generation: self.generation,
            },
        ));
        info!(
            "Generating groups of {} from {} participants (gen: {})",
            self.group_size,
            roster.len(),
            self.generation
        );
        true
    }

    /// Publish the partition for `generation` once its pacing delay is over.
    ///
    /// Uses the roster as it is now. Returns `false` for stale generations.
    pub fn handle_partition_ready(&mut self, generation: u64, roster: &[Participant]) -> bool {
        if generation != self.generation || !self.is_generating {
            debug!(
                "Discarding stale partition event (event gen: {}, current gen: {})",
                generation, self.generation
            );
            return false;
        }

        self.pending_ready = None;
        self.groups = partition_roster(roster, self.group_size, generation, &mut self.rng);
        self.is_generating = false;
        info!(
            "Published {} groups (gen: {})",
            self.groups.len(),
            generation
        );

        if !self.groups.is_empty() {
            self.spawn_naming_task();
        }
        true
    }

    /// Overwrite group names with `names` if they belong to the current
    /// generation and cover every group. Returns whether names were applied.
    pub fn apply_names(&mut self, generation: u64, names: Vec<String>) -> bool {
        if generation != self.generation || self.is_generating {
            debug!(
                "Discarding stale group names (event gen: {}, current gen: {})",
                generation, self.generation
            );
            return false;
        }
        if names.len() < self.groups.len() {
            warn!(
                "Naming service returned {} names for {} groups, keeping placeholders",
                names.len(),
                self.groups.len()
            );
            return false;
        }

        for (group, name) in self.groups.iter_mut().zip(names) {
            group.name = name;
        }
        info!("Applied creative names to {} groups", self.groups.len());
        true
    }

    /// Abort the pending pacing delay and naming request.
    pub fn cancel(&mut self) {
        if let Some(tick) = self.pending_ready.take() {
            tick.cancel();
        }
        self.is_generating = false;
        self.cancel_naming_task();
    }

    fn cancel_naming_task(&mut self) {
        if let Some(handle) = self.naming_task.take() {
            handle.abort();
            debug!("Cancelled previous naming request");
        }
    }

    fn spawn_naming_task(&mut self) {
        let request = NamingRequest {
            count: self.groups.len(),
            current_names: self.groups.iter().map(|g| g.name.clone()).collect(),
        };
        let service = Arc::clone(&self.naming);
        let tx = self.events.clone();
        let generation = self.generation;
        let timeout = self.naming_timeout;

        let handle = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, service.suggest_names(&request)).await
            {
                Ok(result) => result,
                Err(_) => Err(NamingError::Timeout),
            };

            match result {
                Ok(names) => {
                    let _ = tx
                        .send(EngineEvent::NamesSuggested { generation, names })
                        .await;
                }
                Err(NamingError::NotConfigured) => {
                    debug!("Naming service not configured, keeping placeholder names");
                }
                Err(e) => {
                    warn!("Group naming failed (gen: {}): {}", generation, e);
                }
            }
        });

        self.naming_task = Some(handle);
    }
}

impl Drop for PartitionEngine {
    fn drop(&mut self) {
        self.cancel_naming_task();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
