// SPDX-License-Identifier: MIT

//! Turns one [`oj_wire::Request`] into a [`oj_wire::Response`] against a
//! [`DaemonState`] (spec.md §6 Observer Interface, the query/mutation half).

use crate::state::DaemonState;
use oj_core::graph::{DependencyGraph, ReadyPolicy};
use oj_core::JobStatus;
use oj_wire::{JobSummary, PlanStatus, Request, Response};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Dispatches a single request. Never panics: every failure path — a
/// missing plan, a missing job, a storage error — becomes
/// `Response::Error` rather than propagating, since one bad request must
/// not take the connection (or the daemon) down.
pub async fn handle_request(state: &Arc<DaemonState>, request: Request) -> Response {
    match request {
        Request::Status => status(state),
        Request::ListJobs { plan } => list_jobs(&plan),
        Request::GetJob { plan, job_id } => get_job(&plan, job_id),
        Request::RunPlan { plan } => run_plan(state, plan),
        Request::CancelJob { plan, job_id } => cancel_job(state, &plan, job_id).await,
        Request::Shutdown => Response::Ok,
    }
}

fn status(state: &Arc<DaemonState>) -> Response {
    let mut statuses = Vec::new();
    for plan_dir in state.known_plans() {
        match plan_status(&plan_dir) {
            Ok(s) => statuses.push(s),
            Err(err) => warn!(plan = %plan_dir, error = %err, "skipping plan in status reply"),
        }
    }
    Response::Status(statuses)
}

fn plan_status(plan_dir: &str) -> oj_storage::Result<PlanStatus> {
    let plan = oj_storage::load_plan(plan_dir.as_ref())?;
    let resolved = plan.resolve_all_dependencies();
    let policy = ReadyPolicy { needs_review_satisfies: plan.defaults.needs_review_satisfies_dependency };
    let (ready, blocked) = match DependencyGraph::build(plan.jobs(), &resolved) {
        Ok(graph) => graph.ready_set(plan.jobs(), policy),
        Err(_) => (Vec::new(), Default::default()),
    };

    let mut out = PlanStatus { plan: plan_dir.to_string(), ..Default::default() };
    for job in plan.jobs() {
        match job.status {
            JobStatus::Running => out.running.push(JobSummary::from(job)),
            JobStatus::Completed => out.completed += 1,
            JobStatus::Failed => out.failed += 1,
            _ => {}
        }
        if ready.contains(&job.id) {
            out.ready.push(JobSummary::from(job));
        }
    }
    out.blocked = blocked.len();
    Ok(out)
}

fn list_jobs(plan: &str) -> Response {
    match oj_storage::load_plan(plan.as_ref()) {
        Ok(plan) => Response::Jobs(plan.jobs().iter().map(JobSummary::from).collect()),
        Err(err) => Response::Error { message: err.to_string() },
    }
}

fn get_job(plan: &str, job_id: oj_core::JobId) -> Response {
    match oj_storage::load_plan(plan.as_ref()) {
        Ok(loaded) => match loaded.job(job_id) {
            Some(job) => Response::Job(JobSummary::from(job)),
            None => Response::Error { message: format!("no job {job_id} in plan {plan}") },
        },
        Err(err) => Response::Error { message: err.to_string() },
    }
}

fn run_plan(state: &Arc<DaemonState>, plan: String) -> Response {
    let orchestrator = state.orchestrator_for(&plan);
    info!(plan = %plan, "starting run");
    tokio::spawn(async move {
        let report = orchestrator.run(CancellationToken::new(), oj_engine::RunFilter::AllReady).await;
        if !report.errors.is_empty() {
            warn!(errors = ?report.errors, "run finished with errors");
        }
    });
    Response::Ok
}

async fn cancel_job(state: &Arc<DaemonState>, plan: &str, job_id: oj_core::JobId) -> Response {
    let session = match state.session_registry.find(&job_id) {
        Ok(session) => session,
        Err(err) => return Response::Error { message: err.to_string() },
    };
    let Some(session) = session else {
        return Response::Error { message: "job has no live session to cancel".to_string() };
    };

    if let Some(native_id) = &session.native_session_id {
        if let Err(err) = state.multiplexer.kill(native_id).await {
            warn!(error = %err, "failed to kill multiplexer session during cancel");
        }
    } else if session.pid != 0 {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        if let Err(err) = kill(Pid::from_raw(session.pid as i32), Signal::SIGTERM) {
            warn!(error = %err, pid = session.pid, "failed to signal session during cancel");
        }
    }

    if let Err(err) = state.session_registry.remove(&job_id) {
        return Response::Error { message: err.to_string() };
    }

    let plan_dir = std::path::Path::new(plan);
    match oj_storage::load_plan(plan_dir) {
        Ok(loaded) => {
            if let Some(job) = loaded.job(job_id) {
                let observer = oj_storage::NullObserver;
                let persister = oj_storage::PlanPersister::new(plan_dir.to_path_buf(), &observer);
                if let Err(err) = persister.update_status(&job.filename, JobStatus::Interrupted) {
                    return Response::Error { message: err.to_string() };
                }
            }
        }
        Err(err) => return Response::Error { message: err.to_string() },
    }

    Response::Ok
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
