// Events emitted by background tasks back to the engine owner.

/// Asynchronous progress reported by tasks the engines spawn.
///
/// Every variant carries the token of the draw or generation that spawned
/// it. The receiving engine compares the token against its current one and
/// drops anything stale.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The next animation tick of draw `draw_id` is due.
    DrawTick { draw_id: u64 },
    /// The pacing delay of partition generation `generation` has elapsed.
    PartitionReady { generation: u64 },
    /// The naming service returned candidate names for `generation`.
    NamesSuggested { generation: u64, names: Vec<String> },
}
