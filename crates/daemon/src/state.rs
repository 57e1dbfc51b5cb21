// SPDX-License-Identifier: MIT

//! Shared daemon state: one [`oj_engine::Orchestrator`] per plan directory
//! this daemon has been asked to run, all backed by the same session
//! registry, event bus, and adapter stack (spec.md §4.7, §4.9).

use crate::llm::UnconfiguredLlmAdapter;
use oj_adapters::{DesktopNotifyAdapter, GitVcsAdapter, TmuxAdapter};
use oj_core::{JobType, SystemClock};
use oj_engine::executors::{ChatExecutor, HeadlessAgentExecutor, InteractiveAgentExecutor, OneshotExecutor, ShellExecutor};
use oj_engine::{BriefingOptions, EventSink, NotifyBridge, NullSummarizer, Orchestrator, OrchestratorConfig};
use oj_storage::SessionRegistry;
use oj_wire::WireEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the daemon-wide event broadcast channel. Slow subscribers
/// that fall this far behind lose their oldest unread events rather than
/// block the orchestrator loop (spec.md §5: suspensions must never hold a
/// lock other callers need).
const EVENT_CHANNEL_CAPACITY: usize = 1024;

pub type DaemonOrchestrator = Orchestrator<GitVcsAdapter, TmuxAdapter, SystemClock>;

/// Bridges `oj-engine`'s [`EngineEvent`](oj_engine::EngineEvent) stream into
/// the daemon-wide [`WireEvent`] broadcast channel every connected client
/// subscribes to.
pub struct BroadcastEventSink {
    tx: broadcast::Sender<WireEvent>,
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, event: oj_engine::EngineEvent) {
        let wire: WireEvent = match event {
            oj_engine::EngineEvent::Job(observer_event) => observer_event.into(),
            oj_engine::EngineEvent::RunStarted { plan } => WireEvent::RunStarted { plan },
            oj_engine::EngineEvent::RunFinished { plan, error } => WireEvent::RunFinished { plan, error },
            oj_engine::EngineEvent::LogLine { job_id, line } => WireEvent::LogLine { job_id, line },
        };
        // No subscribers is the common case between CLI invocations; that's
        // not an error, just nobody listening yet.
        let _ = self.tx.send(wire);
    }
}

/// Everything a connection handler needs to answer a [`oj_wire::Request`]:
/// the repo root worktrees are created under, the shared session registry,
/// and a lazily-built orchestrator per plan directory.
pub struct DaemonState {
    pub repo_root: PathBuf,
    pub session_registry: Arc<SessionRegistry>,
    pub multiplexer: TmuxAdapter,
    event_tx: broadcast::Sender<WireEvent>,
    orchestrators: Mutex<HashMap<String, Arc<DaemonOrchestrator>>>,
}

impl DaemonState {
    pub fn new(repo_root: PathBuf, session_registry: Arc<SessionRegistry>) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            repo_root,
            session_registry,
            multiplexer: TmuxAdapter::new(),
            event_tx,
            orchestrators: Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WireEvent> {
        self.event_tx.subscribe()
    }

    /// Every plan directory an orchestrator has been built for, in no
    /// particular order — used for startup-wide reconcile sweeps.
    pub fn known_plans(&self) -> Vec<String> {
        self.orchestrators.lock().keys().cloned().collect()
    }

    /// The orchestrator for `plan_dir`, building and caching one on first
    /// use. Every plan shares this daemon's session registry, multiplexer,
    /// and event bus, but gets its own [`oj_engine::WorktreeManager`]
    /// instance (keyed by `plan_dir`, not `repo_root`, only in its in-memory
    /// per-name locks — the on-disk `.grove-worktrees/` namespace is
    /// `repo_root`-wide and shared regardless).
    pub fn orchestrator_for(&self, plan_dir: &str) -> Arc<DaemonOrchestrator> {
        if let Some(existing) = self.orchestrators.lock().get(plan_dir) {
            return Arc::clone(existing);
        }

        let mut executors = oj_engine::ExecutorRegistry::new();
        executors.register(JobType::Shell, Arc::new(ShellExecutor::new()));
        executors.register(JobType::Oneshot, Arc::new(OneshotExecutor::new(UnconfiguredLlmAdapter)));
        executors.register(JobType::Chat, Arc::new(ChatExecutor::new(UnconfiguredLlmAdapter)));
        executors.register(
            JobType::HeadlessAgent,
            Arc::new(HeadlessAgentExecutor::new(
                oj_adapters::SubprocessProviderAdapter::new(),
                "agent",
                Arc::clone(&self.session_registry),
            )),
        );
        executors.register(
            JobType::InteractiveAgent,
            Arc::new(InteractiveAgentExecutor::new(
                self.multiplexer.clone(),
                "agent",
                Arc::clone(&self.session_registry),
            )),
        );

        let events: Arc<dyn EventSink> = Arc::new(BroadcastEventSink { tx: self.event_tx.clone() });
        let orchestrator = Arc::new(Orchestrator::with_notifier(
            PathBuf::from(plan_dir),
            self.repo_root.clone(),
            executors,
            GitVcsAdapter::new(),
            self.multiplexer.clone(),
            Arc::clone(&self.session_registry),
            SystemClock,
            events,
            Arc::new(NullSummarizer),
            BriefingOptions::default(),
            OrchestratorConfig::default(),
            Arc::new(NotifyBridge(DesktopNotifyAdapter::new())),
        ));

        self.orchestrators.lock().insert(plan_dir.to_string(), Arc::clone(&orchestrator));
        orchestrator
    }
}
