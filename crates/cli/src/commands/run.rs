// SPDX-License-Identifier: MIT

//! `oj run` — kick off a plan. Prefers the daemon if one is listening;
//! falls back to running the orchestrator in-process for scripting/CI use
//! when no daemon is reachable (spec.md §4.9 Orchestrator).

use anyhow::Result;
use oj_adapters::{DesktopNotifyAdapter, GitVcsAdapter, TmuxAdapter};
use oj_core::{JobType, SystemClock};
use oj_daemon::llm::UnconfiguredLlmAdapter;
use oj_engine::executors::{
    ChatExecutor, HeadlessAgentExecutor, InteractiveAgentExecutor, OneshotExecutor, ShellExecutor,
};
use oj_engine::{BriefingOptions, NotifyBridge, NullEventSink, NullSummarizer, Orchestrator, OrchestratorConfig, RunFilter};
use oj_storage::SessionRegistry;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client::DaemonClient;

pub async fn handle(plan_dir: &Path, repo_root: &Path, socket_path: &Path) -> Result<()> {
    let plan = plan_dir.to_string_lossy().into_owned();

    match DaemonClient::connect(socket_path).await {
        Ok(mut client) => {
            client.run_plan(&plan).await?;
            println!("Run requested via daemon at {}", socket_path.display());
            Ok(())
        }
        Err(_) => run_in_process(plan_dir, repo_root).await,
    }
}

async fn run_in_process(plan_dir: &Path, repo_root: &Path) -> Result<()> {
    println!("No daemon reachable; running {} in-process", plan_dir.display());

    let session_registry = Arc::new(SessionRegistry::new(SessionRegistry::default_path()));
    let multiplexer = TmuxAdapter::new();

    let mut executors = oj_engine::ExecutorRegistry::new();
    executors.register(JobType::Shell, Arc::new(ShellExecutor::new()));
    executors.register(JobType::Oneshot, Arc::new(OneshotExecutor::new(UnconfiguredLlmAdapter)));
    executors.register(JobType::Chat, Arc::new(ChatExecutor::new(UnconfiguredLlmAdapter)));
    executors.register(
        JobType::HeadlessAgent,
        Arc::new(HeadlessAgentExecutor::new(
            oj_adapters::SubprocessProviderAdapter::new(),
            "agent",
            Arc::clone(&session_registry),
        )),
    );
    executors.register(
        JobType::InteractiveAgent,
        Arc::new(InteractiveAgentExecutor::new(
            multiplexer.clone(),
            "agent",
            Arc::clone(&session_registry),
        )),
    );

    let orchestrator = Arc::new(Orchestrator::with_notifier(
        plan_dir.to_path_buf(),
        repo_root.to_path_buf(),
        executors,
        GitVcsAdapter::new(),
        multiplexer,
        session_registry,
        SystemClock,
        Arc::new(NullEventSink),
        Arc::new(NullSummarizer),
        BriefingOptions::default(),
        OrchestratorConfig::default(),
        Arc::new(NotifyBridge(DesktopNotifyAdapter::new())),
    ));

    let report = orchestrator.run(CancellationToken::new(), RunFilter::AllReady).await;
    println!("Ran {} step(s)", report.steps);
    for error in &report.errors {
        eprintln!("error: {error}");
    }
    if report.errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} job(s) failed during the run", report.errors.len())
    }
}
