// SPDX-License-Identifier: MIT

//! `oj`: the thin CLI front-end. Arg parsing and routing only — it talks
//! to `ojd` over its Unix socket for anything that touches live state, and
//! falls back to running the orchestrator in-process for `oj run` when no
//! daemon is reachable (spec.md §1: CLI argument parsing is out of scope
//! for the core, consumed here as a plain client).

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use clap::{CommandFactory, FromArgMatches, Parser};
use commands::{daemon::DaemonCommand, job::JobCommand, runbook::RunbookCommand};
use exit_error::ExitError;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "oj",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")"),
    about = "LLM job orchestrator"
)]
struct Cli {
    /// Unix socket `ojd` listens on. Defaults to ~/.grove/flow/ojd.sock.
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Output format for commands that print data.
    #[arg(long, value_enum, global = true, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Overall status of every plan the daemon is tracking.
    Status,
    /// Kick off (or resume) a plan's ready jobs.
    Run {
        /// Plan directory.
        plan: PathBuf,
        /// Git repository root worktrees are created under (in-process fallback only).
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,
    },
    /// Inspect and manage jobs within a plan.
    Job {
        /// Plan directory.
        #[arg(long)]
        plan: PathBuf,
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Print a plan's dependency order and ready set without a daemon.
    Resolve {
        /// Plan directory.
        plan: PathBuf,
        /// Treat `needs_review` jobs as satisfying dependents.
        #[arg(long)]
        needs_review_satisfies: bool,
    },
    /// Template & Recipe Store lookups.
    Runbook {
        /// Plan directory templates are resolved against.
        #[arg(long, default_value = ".")]
        plan: PathBuf,
        #[command(subcommand)]
        command: RunbookCommand,
    },
    /// Manage the `ojd` background process.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        if let Some(exit_err) = err.downcast_ref::<ExitError>() {
            eprintln!("error: {exit_err}");
            std::process::exit(exit_err.code);
        }
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let matches = Cli::command().styles(color::styles()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let socket_path = cli.socket.clone().unwrap_or_else(oj_daemon::socket::default_socket_path);

    match cli.command {
        Command::Status => {
            let mut client = client::DaemonClient::connect(&socket_path).await?;
            commands::status::handle(&mut client, cli.output).await
        }
        Command::Run { plan, repo_root } => commands::run::handle(&plan, &repo_root, &socket_path).await,
        Command::Job { plan, command } => {
            let mut client = client::DaemonClient::connect(&socket_path).await?;
            let plan_str = plan.to_string_lossy().into_owned();
            commands::job::handle(command, &mut client, &plan_str, cli.output).await
        }
        Command::Resolve { plan, needs_review_satisfies } => {
            let policy = oj_core::graph::ReadyPolicy { needs_review_satisfies };
            commands::resolve::handle(&plan, policy, cli.output)
        }
        Command::Runbook { plan, command } => commands::runbook::handle(command, &plan, cli.output).await,
        Command::Daemon { command } => commands::daemon::handle(command, &socket_path).await,
    }
}
