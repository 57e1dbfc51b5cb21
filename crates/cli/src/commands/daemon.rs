// SPDX-License-Identifier: MIT

//! `oj daemon` — start `ojd` in the background and ask it to shut down
//! (spec.md §4.7, §4.9: `ojd` is the daemon-resident orchestrator host;
//! this just manages the process, the rest of the CLI talks to it).

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::client::DaemonClient;

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start `ojd` in the background if it isn't already listening.
    Start {
        /// Git repository root worktrees are created under.
        #[arg(long)]
        repo_root: PathBuf,
    },
    /// Check whether `ojd` is reachable on the configured socket.
    Status,
    /// Ask the daemon to exit once its current work settles.
    Shutdown,
}

pub async fn handle(command: DaemonCommand, socket_path: &Path) -> Result<()> {
    match command {
        DaemonCommand::Start { repo_root } => start(&repo_root, socket_path),
        DaemonCommand::Status => {
            match DaemonClient::connect(socket_path).await {
                Ok(_) => println!("ojd is listening on {}", socket_path.display()),
                Err(_) => println!("ojd is not running"),
            }
            Ok(())
        }
        DaemonCommand::Shutdown => {
            let mut client = DaemonClient::connect(socket_path)
                .await
                .context("ojd is not running")?;
            client.shutdown().await?;
            println!("Shutdown requested");
            Ok(())
        }
    }
}

fn start(repo_root: &Path, socket_path: &Path) -> Result<()> {
    if socket_path.exists() {
        bail!("a socket already exists at {} — is ojd already running?", socket_path.display());
    }

    let binary = daemon_binary_path()?;
    Command::new(binary)
        .arg("--repo-root")
        .arg(repo_root)
        .arg("--socket")
        .arg(socket_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawning ojd")?;

    println!("Started ojd for {}", repo_root.display());
    Ok(())
}

/// Locate the `ojd` binary next to the running `oj` executable, falling
/// back to `$PATH`.
fn daemon_binary_path() -> Result<PathBuf> {
    if let Ok(current_exe) = std::env::current_exe() {
        if let Some(dir) = current_exe.parent() {
            let candidate = dir.join("ojd");
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }
    Ok(PathBuf::from("ojd"))
}
