// Cancellable one-shot scheduled events.
//
// A `ScheduledTick` sleeps on a tokio task and then delivers an
// `EngineEvent` to the engine owner. Dropping the handle aborts the task, so
// an engine that is torn down never receives a continuation afterwards.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::protocol::EngineEvent;

/// Handle to a pending scheduled event. Aborts the event on drop.
#[derive(Debug)]
pub struct ScheduledTick {
    handle: JoinHandle<()>,
}

impl ScheduledTick {
    /// Deliver `event` on `tx` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(delay: Duration, tx: mpsc::Sender<EngineEvent>, event: EngineEvent) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(event).await.is_err() {
                debug!("engine event receiver dropped before scheduled event fired");
            }
        });
        ScheduledTick { handle }
    }

    /// Abort the pending event. A no-op if it already fired.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for ScheduledTick {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
