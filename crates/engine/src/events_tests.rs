// SPDX-License-Identifier: MIT

use super::*;
use oj_core::JobId;
use std::sync::Arc;

#[test]
fn observer_bridge_forwards_job_events() {
    let sink = Arc::new(RecordingEventSink::default());
    let bridge = ObserverBridge(sink.clone());
    let job_id = JobId::new();
    bridge.emit(ObserverEvent::JobAdded { job_id });
    assert_eq!(sink.events.lock().as_slice(), &[EngineEvent::Job(ObserverEvent::JobAdded { job_id })]);
}

#[test]
fn null_sink_drops_everything() {
    let sink = NullEventSink;
    sink.emit(EngineEvent::RunStarted { plan: "demo".into() });
}
