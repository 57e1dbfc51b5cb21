// SPDX-License-Identifier: MIT

//! The orchestrator's half of the Observer Interface (spec.md §6):
//! `RunStarted`/`RunFinished`/`LogLine`, the run-level events only a live
//! orchestrator can see, alongside the job-level `ObserverEvent`s
//! `oj-storage`'s persister emits directly. Both flow through one
//! `EventSink` so a front-end subscribes to a single stream.

use oj_core::JobId;
use oj_storage::{ObserverEvent, ObserverSink};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Job(ObserverEvent),
    RunStarted { plan: String },
    RunFinished { plan: String, error: Option<String> },
    LogLine { job_id: JobId, line: String },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Collects every event emitted during a run, for assertions in tests.
#[derive(Default)]
pub struct RecordingEventSink {
    pub events: parking_lot::Mutex<Vec<EngineEvent>>,
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().push(event);
    }
}

/// Adapts an `EventSink` to the narrower `ObserverSink` the state
/// persister speaks, so one sink backs both. Owns its `Arc` (rather than
/// borrowing) so it can be moved into a spawned worker task alongside the
/// `PlanPersister` built on top of it.
pub struct ObserverBridge(pub Arc<dyn EventSink>);

impl ObserverSink for ObserverBridge {
    fn emit(&self, event: ObserverEvent) {
        self.0.emit(EngineEvent::Job(event));
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
