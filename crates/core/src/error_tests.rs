// SPDX-License-Identifier: MIT

use super::*;
use crate::job::JobStatus;

#[test]
fn provider_transport_is_locally_recoverable() {
    assert!(JobError::ProviderTransport("connection reset".into()).is_locally_recoverable());
}

#[test]
fn provider_refusal_is_not_locally_recoverable() {
    assert!(!JobError::ProviderRefusal("policy".into()).is_locally_recoverable());
}

#[test]
fn canceled_resolves_to_interrupted() {
    assert_eq!(JobError::Canceled.resulting_status(), JobStatus::Interrupted);
}

#[test]
fn dangling_dependency_resolves_to_blocked() {
    let err = JobError::DanglingDependency { job_id: JobId::new() };
    assert_eq!(err.resulting_status(), JobStatus::Blocked);
}

#[test]
fn timeout_resolves_to_failed() {
    let err = JobError::Timeout(std::time::Duration::from_secs(30));
    assert_eq!(err.resulting_status(), JobStatus::Failed);
}

#[test]
fn only_cycle_and_duplicate_id_abort_the_run() {
    assert!(JobError::Cycle("a -> b -> a".into()).aborts_run());
    assert!(JobError::DuplicateId(JobId::new()).aborts_run());
    assert!(!JobError::ChildExitNonZero { code: 1 }.aborts_run());
}
