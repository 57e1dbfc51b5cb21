// SPDX-License-Identifier: MIT

use super::*;
use crate::briefing::Briefing;
use crate::executor::NullWriter;
use crate::llm::FakeLlmAdapter;
use crate::test_support::{test_job, test_plan};
use oj_core::job::JobType;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn request<'a>(job: &'a oj_core::Job, plan: &'a oj_core::Plan, briefing: &'a Briefing) -> ExecutionRequest<'a> {
    ExecutionRequest {
        job,
        plan,
        briefing,
        workdir: plan.directory.as_path(),
        cancel: CancellationToken::new(),
        now: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn completes_with_llm_reply() {
    let job = test_job("01-a.md", JobType::Oneshot, "hello");
    let plan = test_plan(PathBuf::from("/plan"), vec![job.clone()]);
    let briefing = Briefing { text: "hello".into(), attachments: vec![] };
    let executor = OneshotExecutor::new(FakeLlmAdapter::new("world"));

    let outcome = executor.execute(request(&job, &plan, &briefing), &NullWriter).await.unwrap();
    match outcome {
        Outcome::Completed { append_text, needs_review, summary_seed } => {
            assert!(append_text.contains("world"));
            assert!(!needs_review);
            assert_eq!(summary_seed.as_deref(), Some("world"));
        }
        _ => panic!("expected Completed"),
    }
}

#[tokio::test]
async fn refusal_maps_to_provider_refusal_error() {
    let job = test_job("01-a.md", JobType::Oneshot, "hello");
    let plan = test_plan(PathBuf::from("/plan"), vec![job.clone()]);
    let briefing = Briefing { text: "hello".into(), attachments: vec![] };
    let executor = OneshotExecutor::new(FakeLlmAdapter::refusing("policy"));

    let err = executor.execute(request(&job, &plan, &briefing), &NullWriter).await.unwrap_err();
    assert!(matches!(err, JobError::ProviderRefusal(_)));
}
