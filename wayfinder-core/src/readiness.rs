//! Readiness signaling for late-initializing collaborators
//!
//! The rendering world can come up after the engine. Rather than polling it
//! on a fixed interval, the world side flips a watch channel once its scene
//! graph exists, and the engine side awaits that flip exactly once with a
//! bounded timeout.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time;

use crate::types::{EngineError, Result};

/// World-side half of the readiness gate.
pub struct WorldGate {
    tx: watch::Sender<bool>,
}

/// Engine-side half: a one-shot bounded wait.
pub struct WorldReady {
    rx: watch::Receiver<bool>,
}

impl WorldGate {
    pub fn new() -> (WorldGate, WorldReady) {
        let (tx, rx) = watch::channel(false);
        (WorldGate { tx }, WorldReady { rx })
    }

    /// Signal that the world collaborator is ready. Idempotent.
    pub fn open(&self) {
        let _ = self.tx.send(true);
    }
}

impl WorldReady {
    /// Wait until the world is ready, failing with `CollaboratorNotReady`
    /// once `timeout` expires or the world side is dropped without opening.
    pub async fn wait(mut self, timeout: Duration) -> Result<()> {
        match time::timeout(timeout, self.rx.wait_for(|ready| *ready)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) | Err(_) => Err(EngineError::CollaboratorNotReady(timeout)),
        }
    }
}
