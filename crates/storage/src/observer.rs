// SPDX-License-Identifier: MIT

//! The slice of the Observer Interface (spec.md §4.7, §6) that the state
//! persister emits directly: job-level disk mutations. `oj-engine` wraps
//! this in its own event bus alongside run-level events (`RunStarted`,
//! `RunFinished`, `LogLine`) that only it can observe.
//!
//! Events are emitted strictly after the underlying disk state has been
//! written, never before.

use oj_core::JobId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    JobAdded { job_id: JobId },
    JobUpdated { job_id: JobId, field: String },
    JobRemoved { job_id: JobId },
}

pub trait ObserverSink: Send + Sync {
    fn emit(&self, event: ObserverEvent);
}

/// An `ObserverSink` that drops every event. Useful for callers (tests,
/// one-off CLI reads) that don't need the persister's event stream.
pub struct NullObserver;

impl ObserverSink for NullObserver {
    fn emit(&self, _event: ObserverEvent) {}
}

/// Collects events in order, for asserting on persister behavior in tests.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: parking_lot::Mutex<Vec<ObserverEvent>>,
}

impl ObserverSink for RecordingObserver {
    fn emit(&self, event: ObserverEvent) {
        self.events.lock().push(event);
    }
}
