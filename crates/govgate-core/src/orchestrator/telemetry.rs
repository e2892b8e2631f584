// crates/govgate-core/src/orchestrator/telemetry.rs
// ============================================================================
// Module: Orchestrator Telemetry
// Description: The degraded-status ring buffer event log writes land in when
//              they fail.
// Purpose: Implement spec §7's "degraded-status ring buffer (capacity 20,
//          newest-wins)" without pulling in an external logging crate.
// Dependencies: crate::entities::time, std::sync::Mutex
// ============================================================================

//! ## Overview
//! This is not a general-purpose logging facility. The event log itself is
//! the system's audit trail (spec §4.2); this buffer exists only to surface
//! the rare case where an event log *write* failed so operators can see it
//! via a status query (spec §7), without that failure ever aborting the
//! business operation that triggered it.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::entities::time::Timestamp;

/// A single degraded-mode telemetry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorEvent {
    /// When the failure was observed.
    pub timestamp: Timestamp,
    /// The event type that failed to be written, if applicable.
    pub event_type: String,
    /// Human-readable failure message.
    pub message: String,
}

/// A fixed-capacity, newest-wins ring buffer of [`OrchestratorEvent`]s.
#[derive(Debug)]
pub struct DegradedRingBuffer {
    entries: Mutex<VecDeque<OrchestratorEvent>>,
}

impl DegradedRingBuffer {
    /// Fixed capacity mandated by spec §7.
    pub const CAPACITY: usize = 20;

    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(Self::CAPACITY)),
        }
    }

    /// Records `event`, evicting the oldest entry if the buffer is full.
    pub fn record(&self, event: OrchestratorEvent) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.len() == Self::CAPACITY {
            entries.pop_front();
        }
        entries.push_back(event);
    }

    /// Returns a snapshot of the currently buffered entries, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OrchestratorEvent> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.iter().cloned().collect()
    }

    /// Returns whether the buffer currently holds any entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.is_empty()
    }
}

impl Default for DegradedRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
