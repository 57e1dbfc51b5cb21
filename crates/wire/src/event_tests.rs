// SPDX-License-Identifier: MIT

use super::*;
use oj_core::JobId;

#[test]
fn job_updated_round_trips_through_json() {
    let event = WireEvent::JobUpdated {
        job_id: JobId::new(),
        field: "status".to_string(),
    };
    let json = serde_json::to_string(&event).expect("serialize");
    let back: WireEvent = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(event, back);
}

#[test]
fn converts_from_storage_observer_event() {
    let job_id = JobId::new();
    let storage_event = oj_storage::ObserverEvent::JobAdded { job_id: job_id.clone() };
    let wire_event: WireEvent = storage_event.into();
    assert_eq!(wire_event, WireEvent::JobAdded { job_id });
}

#[test]
fn run_finished_carries_optional_error() {
    let event = WireEvent::RunFinished {
        plan: "plans/demo".to_string(),
        error: Some("cycle detected".to_string()),
    };
    let json = serde_json::to_string(&event).expect("serialize");
    let back: WireEvent = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(event, back);
}
