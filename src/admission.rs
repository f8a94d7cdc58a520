//! Admission control: bound how many conversions run at once.
//!
//! The HTTP server happily accepts thousands of connections, but every
//! conversion spawns a heavyweight converter process and touches the disk.
//! [`AdmissionController`] narrows "requests accepted" down to "conversions
//! running" with a counting semaphore. Callers beyond the ceiling queue with
//! no timeout, trading latency for a bounded memory and CPU footprint.
//!
//! A slot is represented by an [`AdmissionToken`]. Dropping the token frees
//! the slot, so release happens exactly once on every exit path, including
//! `?` early returns and panics.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Counting limiter shared by every request handler.
///
/// Cheap to clone; all clones share the same slots.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One reserved conversion slot. Released on drop.
#[derive(Debug)]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionController {
    /// Create a controller allowing at most `capacity` concurrent conversions.
    ///
    /// A capacity of zero is raised to one; a zero-slot controller would
    /// block every request forever.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait until a slot is free and reserve it.
    ///
    /// There is no timeout. Waiters are served in FIFO order.
    pub async fn acquire(&self) -> AdmissionToken {
        // The semaphore is never closed, so acquisition cannot fail.
        let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(p) => p,
            Err(_) => unreachable!("admission semaphore is never closed"),
        };
        debug!(in_flight = self.in_flight(), capacity = self.capacity, "admission slot acquired");
        AdmissionToken { _permit: permit }
    }

    /// Reserve a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<AdmissionToken> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionToken { _permit: permit })
    }

    /// Configured ceiling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

impl AdmissionToken {
    /// Release the slot explicitly. Equivalent to dropping the token.
    pub fn release(self) {}
}
