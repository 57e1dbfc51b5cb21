// SPDX-License-Identifier: MIT

use super::*;
use crate::job::{InlinePolicy, JobType};
use proptest::prelude::*;
use std::collections::HashMap;

fn job(filename: &str, status: JobStatus) -> Job {
    Job {
        id: JobId::new(),
        filename: filename.into(),
        title: filename.into(),
        status,
        job_type: JobType::Oneshot,
        depends_on: vec![],
        model: None,
        template: None,
        worktree: None,
        include: vec![],
        inline: InlinePolicy::default(),
        prepend_dependencies: false,
        agent_continue: false,
        generate_plan_from: false,
        rules_file: None,
        created_at: None,
        updated_at: None,
        completed_at: None,
        duration: None,
        summary: None,
        body: String::new(),
        body_separator: "\n\n".to_string(),
        has_dangling_dependency: false,
    }
}

#[test]
fn linear_chain_orders_by_dependency() {
    let a = job("01-a.md", JobStatus::Pending);
    let b = job("02-b.md", JobStatus::Pending);
    let c = job("03-c.md", JobStatus::Pending);
    let jobs = vec![a.clone(), b.clone(), c.clone()];
    let mut resolved = HashMap::new();
    resolved.insert(b.id, vec![a.id]);
    resolved.insert(c.id, vec![b.id]);

    let graph = DependencyGraph::build(&jobs, &resolved).unwrap();
    let order = graph.order();
    let pos = |id: JobId| order.iter().position(|o| *o == id).unwrap();
    assert!(pos(a.id) < pos(b.id));
    assert!(pos(b.id) < pos(c.id));
}

#[test]
fn independent_jobs_tie_break_on_filename() {
    let z = job("z.md", JobStatus::Pending);
    let a = job("a.md", JobStatus::Pending);
    let jobs = vec![z.clone(), a.clone()];
    let graph = DependencyGraph::build(&jobs, &HashMap::new()).unwrap();
    assert_eq!(graph.order(), &[a.id, z.id]);
}

#[test]
fn cycle_is_detected() {
    let a = job("a.md", JobStatus::Pending);
    let b = job("b.md", JobStatus::Pending);
    let jobs = vec![a.clone(), b.clone()];
    let mut resolved = HashMap::new();
    resolved.insert(a.id, vec![b.id]);
    resolved.insert(b.id, vec![a.id]);

    let err = DependencyGraph::build(&jobs, &resolved).unwrap_err();
    assert!(matches!(err, GraphError::Cycle(_)));
}

#[test]
fn ready_set_excludes_jobs_with_incomplete_dependency() {
    let a = job("01-a.md", JobStatus::Pending);
    let b = job("02-b.md", JobStatus::Pending);
    let jobs = vec![a.clone(), b.clone()];
    let mut resolved = HashMap::new();
    resolved.insert(b.id, vec![a.id]);

    let graph = DependencyGraph::build(&jobs, &resolved).unwrap();
    let (ready, blocked) = graph.ready_set(&jobs, ReadyPolicy::default());
    assert_eq!(ready, vec![a.id]);
    assert!(blocked.is_empty());
}

#[test]
fn ready_set_marks_dependents_of_failed_job_blocked_not_abandoned() {
    let a = job("01-a.md", JobStatus::Completed);
    let b = job("02-b.md", JobStatus::Failed);
    let c = job("03-c.md", JobStatus::Pending);
    let jobs = vec![a.clone(), b.clone(), c.clone()];
    let mut resolved = HashMap::new();
    resolved.insert(b.id, vec![a.id]);
    resolved.insert(c.id, vec![b.id]);

    let graph = DependencyGraph::build(&jobs, &resolved).unwrap();
    let (ready, blocked) = graph.ready_set(&jobs, ReadyPolicy::default());
    assert!(ready.is_empty());
    assert!(blocked.contains(&c.id));
    assert_eq!(c.status, JobStatus::Pending);
}

#[test]
fn needs_review_satisfies_dependency_when_policy_enabled() {
    let a = job("01-a.md", JobStatus::NeedsReview);
    let b = job("02-b.md", JobStatus::Pending);
    let jobs = vec![a.clone(), b.clone()];
    let mut resolved = HashMap::new();
    resolved.insert(b.id, vec![a.id]);

    let graph = DependencyGraph::build(&jobs, &resolved).unwrap();
    let (ready, _) = graph.ready_set(&jobs, ReadyPolicy { needs_review_satisfies: true });
    assert_eq!(ready, vec![b.id]);

    let (ready_default, _) = graph.ready_set(&jobs, ReadyPolicy::default());
    assert!(ready_default.is_empty());
}

#[test]
fn transitive_dependents_follows_chain() {
    let a = job("01-a.md", JobStatus::Pending);
    let b = job("02-b.md", JobStatus::Pending);
    let c = job("03-c.md", JobStatus::Pending);
    let jobs = vec![a.clone(), b.clone(), c.clone()];
    let mut resolved = HashMap::new();
    resolved.insert(b.id, vec![a.id]);
    resolved.insert(c.id, vec![b.id]);

    let graph = DependencyGraph::build(&jobs, &resolved).unwrap();
    let deps = graph.transitive_dependents(a.id);
    assert!(deps.contains(&b.id));
    assert!(deps.contains(&c.id));
}

#[yare::parameterized(
    completed    = { JobStatus::Completed,   true },
    pending      = { JobStatus::Pending,     false },
    running      = { JobStatus::Running,     false },
    failed       = { JobStatus::Failed,      false },
    blocked      = { JobStatus::Blocked,     false },
    needs_review = { JobStatus::NeedsReview, false },
    interrupted  = { JobStatus::Interrupted, false },
    abandoned    = { JobStatus::Abandoned,   false },
)]
fn ready_set_under_the_default_policy_requires_dependency_completed(dep_status: JobStatus, expect_ready: bool) {
    let a = job("01-a.md", dep_status);
    let b = job("02-b.md", JobStatus::Pending);
    let jobs = vec![a.clone(), b.clone()];
    let mut resolved = HashMap::new();
    resolved.insert(b.id, vec![a.id]);

    let graph = DependencyGraph::build(&jobs, &resolved).unwrap();
    let (ready, _) = graph.ready_set(&jobs, ReadyPolicy::default());
    assert_eq!(ready.contains(&b.id), expect_ready);
}

#[test]
fn dangling_dependency_blocks_job() {
    let mut b = job("02-b.md", JobStatus::Pending);
    b.has_dangling_dependency = true;
    let jobs = vec![b.clone()];
    let graph = DependencyGraph::build(&jobs, &HashMap::new()).unwrap();
    let (ready, blocked) = graph.ready_set(&jobs, ReadyPolicy::default());
    assert!(ready.is_empty());
    assert!(blocked.contains(&b.id));
}

const ACYCLIC_PLAN_JOBS: usize = 8;
const ACYCLIC_PLAN_EDGE_SLOTS: usize = ACYCLIC_PLAN_JOBS * (ACYCLIC_PLAN_JOBS - 1) / 2;

/// Arbitrary acyclic plans over a fixed job count: job `i` may only depend on
/// jobs `0..i` (a flat lower-triangular bitset, one bit per `(i, j)` pair with
/// `j < i`), which by construction rules out cycles regardless of which bits
/// are set.
fn arb_acyclic_plan() -> impl Strategy<Value = (Vec<Job>, HashMap<JobId, Vec<JobId>>)> {
    proptest::collection::vec(any::<bool>(), ACYCLIC_PLAN_EDGE_SLOTS).prop_map(|edge_bits| {
        let jobs: Vec<Job> =
            (0..ACYCLIC_PLAN_JOBS).map(|i| job(&format!("{i:02}-job.md"), JobStatus::Pending)).collect();

        let mut resolved = HashMap::new();
        let mut slot = 0;
        for i in 0..ACYCLIC_PLAN_JOBS {
            let mut deps = Vec::new();
            for j in 0..i {
                if edge_bits[slot] {
                    deps.push(jobs[j].id);
                }
                slot += 1;
            }
            resolved.insert(jobs[i].id, deps);
        }
        (jobs, resolved)
    })
}

proptest! {
    #[test]
    fn topological_order_always_places_dependencies_before_dependents((jobs, resolved) in arb_acyclic_plan()) {
        let graph = DependencyGraph::build(&jobs, &resolved).unwrap();
        let order = graph.order();
        prop_assert_eq!(order.len(), jobs.len());

        let position: HashMap<JobId, usize> = order.iter().enumerate().map(|(idx, id)| (*id, idx)).collect();
        for job in &jobs {
            for dep in graph.depends_on(job.id) {
                prop_assert!(position[dep] < position[&job.id]);
            }
        }
    }
}
