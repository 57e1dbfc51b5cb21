// SPDX-License-Identifier: MIT

//! `shell` executor (spec.md §4.8): runs the job body as a single command
//! string in the worktree via the OS process adapter. Exit code zero is
//! `completed`; non-zero is `failed` with the code recorded
//! (`ErrChildExitNonZero`).

use crate::executor::{output_section, ExecutionRequest, Executor, Outcome, OutputWriter};
use async_trait::async_trait;
use oj_core::JobError;
use oj_shell::run_command;

#[derive(Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn execute(&self, req: ExecutionRequest<'_>, writer: &dyn OutputWriter) -> Result<Outcome, JobError> {
        let env = req.job.model.as_ref().map(|m| vec![("OJ_MODEL".to_string(), m.clone())]).unwrap_or_default();
        let outcome = run_command(req.job.body.trim(), req.workdir, &env, req.cancel.clone())
            .await
            .map_err(|e| JobError::ProviderTransport(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&outcome.stdout);
        let stderr = String::from_utf8_lossy(&outcome.stderr);
        for line in stdout.lines().chain(stderr.lines()) {
            writer.write_line(line);
        }
        let combined = format!("{stdout}{stderr}");

        if outcome.success() {
            Ok(Outcome::Completed {
                append_text: output_section(&combined),
                needs_review: false,
                summary_seed: Some(combined),
            })
        } else {
            Err(JobError::ChildExitNonZero { code: outcome.exit_code })
        }
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
