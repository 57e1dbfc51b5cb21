// SPDX-License-Identifier: MIT

//! Unix-socket client for `ojd` (spec.md §6 Observer Interface). Each
//! command issues a single request/response round trip over `oj-wire`'s
//! length-prefixed JSON framing; there is no connection pooling because
//! the CLI is a one-shot process per invocation.

use anyhow::{anyhow, Context, Result};
use oj_core::JobId;
use oj_wire::{decode, encode, read_message, write_message, JobSummary, PlanStatus, Request, Response};
use std::path::Path;
use tokio::net::UnixStream;

pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    pub async fn connect(socket_path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .await
            .with_context(|| format!("connecting to daemon socket at {}", socket_path.display()))?;
        Ok(Self { stream })
    }

    async fn roundtrip(&mut self, request: Request) -> Result<Response> {
        let payload = encode(&request)?;
        write_message(&mut self.stream, &payload).await?;
        let bytes = read_message(&mut self.stream).await?;
        Ok(decode(&bytes)?)
    }

    pub async fn status(&mut self) -> Result<Vec<PlanStatus>> {
        match self.roundtrip(Request::Status).await? {
            Response::Status(statuses) => Ok(statuses),
            other => unexpected(other),
        }
    }

    pub async fn list_jobs(&mut self, plan: &str) -> Result<Vec<JobSummary>> {
        match self.roundtrip(Request::ListJobs { plan: plan.to_string() }).await? {
            Response::Jobs(jobs) => Ok(jobs),
            other => unexpected(other),
        }
    }

    pub async fn get_job(&mut self, plan: &str, job_id: JobId) -> Result<JobSummary> {
        match self.roundtrip(Request::GetJob { plan: plan.to_string(), job_id }).await? {
            Response::Job(job) => Ok(job),
            other => unexpected(other),
        }
    }

    pub async fn run_plan(&mut self, plan: &str) -> Result<()> {
        match self.roundtrip(Request::RunPlan { plan: plan.to_string() }).await? {
            Response::Ok => Ok(()),
            other => unexpected(other),
        }
    }

    pub async fn cancel_job(&mut self, plan: &str, job_id: JobId) -> Result<()> {
        match self.roundtrip(Request::CancelJob { plan: plan.to_string(), job_id }).await? {
            Response::Ok => Ok(()),
            other => unexpected(other),
        }
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        match self.roundtrip(Request::Shutdown).await? {
            Response::Ok => Ok(()),
            other => unexpected(other),
        }
    }
}

fn unexpected<T>(response: Response) -> Result<T> {
    match response {
        Response::Error { message } => Err(anyhow!(message)),
        other => Err(anyhow!("unexpected response from daemon: {other:?}")),
    }
}
