//! The single-slot handoff cell between the resolution worker and the
//! control loop.
//!
//! This is the only cross-thread synchronization point in the system. The
//! worker computes a resolved stream and deposits the result; the control
//! loop drains the slot on its next tick and owns every other piece of
//! mutable state. There is no cancel-in-flight: a worker that is already
//! running deposits when it finishes, and a stuck network call only leaves
//! the loading indicator up.

use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use crate::error::ResolutionError;

use super::resolver::{ResolveRequest, ResolvedStream, StreamResolver};

type Slot = Arc<Mutex<Option<Result<ResolvedStream, ResolutionError>>>>;

#[derive(Clone, Default)]
pub struct HandoffCell {
    slot: Slot,
}

impl HandoffCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Worker side. Replaces any undrained result -- newest wins, same as
    /// notifications.
    pub fn deposit(&self, result: Result<ResolvedStream, ResolutionError>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(result);
        }
    }

    /// Control-loop side; drains the slot.
    pub fn take(&self) -> Option<Result<ResolvedStream, ResolutionError>> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Run one resolution on a detached worker thread. The worker touches
/// nothing but the cell.
pub fn spawn_resolution(
    resolver: Arc<dyn StreamResolver>,
    request: ResolveRequest,
    cell: HandoffCell,
) {
    thread::spawn(move || {
        let result = resolver.resolve(&request);
        match &result {
            Ok(stream) => debug!(title = %stream.title, "resolution finished"),
            Err(err) => warn!(%err, "resolution failed"),
        }
        cell.deposit(result);
    });
}
