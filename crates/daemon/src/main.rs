// SPDX-License-Identifier: MIT

//! `ojd`: the long-running host process. Binds a Unix socket, reconciles
//! session state left behind by a previous run, and serves `oj-wire`
//! requests until asked to shut down or interrupted (spec.md §4.7, §4.9).

use clap::Parser;
use oj_adapters::MultiplexerAdapter;
use oj_daemon::state::DaemonState;
use oj_daemon::socket;
use oj_storage::SessionRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ojd", about = "Host process for the oj job orchestrator")]
struct Args {
    /// Git repository root worktrees are created under.
    #[arg(long)]
    repo_root: PathBuf,

    /// Unix socket path to listen on. Defaults to ~/.grove/flow/ojd.sock.
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Plan directories to reconcile against on startup.
    #[arg(long = "plan")]
    plans: Vec<PathBuf>,

    /// Directory to write the daemon's own log file under.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn init_logging(log_dir: Option<PathBuf>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ojd.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    // Held for the process lifetime: dropping it would stop flushing the
    // non-blocking log writer.
    let _log_guard = init_logging(args.log_dir);

    let socket_path = args.socket.unwrap_or_else(socket::default_socket_path);
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let session_registry = Arc::new(SessionRegistry::new(SessionRegistry::default_path()));
    let state = Arc::new(DaemonState::new(args.repo_root, Arc::clone(&session_registry)));

    tracing::info!(socket = %socket_path.display(), "reconciling session state on startup");
    match session_registry.reconcile(&oj_storage::SignalProbe) {
        Ok(report) if !report.interrupted.is_empty() => {
            tracing::warn!(count = report.interrupted.len(), "found sessions with dead pids on startup")
        }
        Ok(_) => {}
        Err(err) => tracing::error!(error = %err, "startup reconcile failed"),
    }
    for plan in &args.plans {
        let orchestrator = state.orchestrator_for(&plan.to_string_lossy());
        if let Err(err) = orchestrator.reconcile().await {
            tracing::error!(plan = %plan.display(), error = %err, "plan reconcile failed");
        }
    }

    let listener = socket::bind(&socket_path)?;
    tracing::info!(socket = %socket_path.display(), "listening");

    let shutdown = CancellationToken::new();
    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received ctrl-c, shutting down");
        ctrl_c_shutdown.cancel();
    });

    socket::serve(listener, Arc::clone(&state), shutdown).await;

    // Only kill tmux sessions this daemon itself registered — never a
    // blanket `tmux kill-server`, which would take down sessions other
    // tools or users own.
    if let Ok(sessions) = session_registry.all() {
        for session in sessions {
            if let Some(native_id) = &session.native_session_id {
                let _ = state.multiplexer.kill(native_id).await;
            }
        }
    }

    let _ = std::fs::remove_file(&socket_path);
    Ok(())
}
