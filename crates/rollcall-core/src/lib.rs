// Library root for the roster, drawing and partitioning engines.
//
// Both engines read a roster owned by the caller and report asynchronous
// progress (animation ticks, pacing delays, naming results) as
// `EngineEvent`s over an mpsc channel so that every state mutation happens
// on the task that owns the engines.

pub mod config;
pub mod draw;
pub mod export;
pub mod naming;
pub mod partition;
pub mod participant;
pub mod protocol;
pub mod roster;
pub mod timer;

/// Random source injected into the engines.
///
/// Production code uses a `SmallRng` seeded from the OS; tests pass a seeded
/// `StdRng` so shuffles and picks are reproducible.
pub type DynRng = Box<dyn rand::RngCore + Send + Sync>;

/// Build the default, OS-seeded random source.
pub fn default_rng() -> DynRng {
    use rand::SeedableRng;
    Box::new(rand::rngs::SmallRng::from_os_rng())
}
