//! Application-wide single-flight guard for turns.
//!
//! At most one turn (send, profile creation, reply retry) may be in flight
//! across all profiles. Holding a [`TurnPermit`] is what "in flight" means;
//! dropping it, on success or on any error path, frees the gate.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// One-permit gate shared by every turn-producing handler.
#[derive(Debug, Clone)]
pub struct TurnGate {
    semaphore: Arc<Semaphore>,
}

/// Proof that the caller owns the gate. Released on drop.
#[derive(Debug)]
pub struct TurnPermit {
    _permit: OwnedSemaphorePermit,
}

impl TurnGate {
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// Takes the gate without waiting. `None` while another turn holds it.
    pub fn try_begin(&self) -> Option<TurnPermit> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| TurnPermit { _permit: permit })
    }

    /// True while a permit is outstanding.
    pub fn is_busy(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

impl Default for TurnGate {
    fn default() -> Self {
        Self::new()
    }
}
