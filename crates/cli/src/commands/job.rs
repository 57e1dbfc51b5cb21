// SPDX-License-Identifier: MIT

//! `oj job` — list, show, and cancel jobs in a plan over the daemon's
//! request/response surface (spec.md §3 Job, §6 Observer Interface).

use anyhow::{Context, Result};
use clap::Subcommand;
use std::io::Write;

use crate::client::DaemonClient;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Subcommand)]
pub enum JobCommand {
    /// List every job in a plan, in dependency order.
    List,
    /// Show a single job's current frontmatter state.
    Show {
        /// Job id, or an unambiguous prefix of one.
        id: String,
    },
    /// Cancel a single in-flight job.
    Cancel {
        /// Job id, or an unambiguous prefix of one.
        id: String,
    },
}

pub async fn handle(
    command: JobCommand,
    client: &mut DaemonClient,
    plan: &str,
    format: OutputFormat,
) -> Result<()> {
    match command {
        JobCommand::List => {
            let jobs = client.list_jobs(plan).await?;
            handle_list(format, &jobs, "No jobs in this plan", |jobs, out| {
                for job in jobs {
                    let _ = writeln!(
                        out,
                        "{}  {:<10}  {:<14}  {}",
                        job.id,
                        format!("{:?}", job.job_type).to_lowercase(),
                        format!("{:?}", job.status).to_lowercase(),
                        job.title,
                    );
                }
            })
        }
        JobCommand::Show { id } => {
            let job_id = resolve_job_id(client, plan, &id).await?;
            let job = client.get_job(plan, job_id).await?;
            format_or_json(format, &job, || {
                println!("{}  {}", crate::color::header(&job.filename), job.title);
                println!("  id:          {}", job.id);
                println!("  type:        {:?}", job.job_type);
                println!("  status:      {:?}", job.status);
                if !job.depends_on.is_empty() {
                    println!("  depends_on:  {}", job.depends_on.join(", "));
                }
            })
        }
        JobCommand::Cancel { id } => {
            let job_id = resolve_job_id(client, plan, &id).await?;
            client.cancel_job(plan, job_id).await?;
            println!("Cancelled job {}", job_id);
            Ok(())
        }
    }
}

/// Resolve a bare or prefix job id against the plan's current job list.
async fn resolve_job_id(
    client: &mut DaemonClient,
    plan: &str,
    query: &str,
) -> Result<oj_core::JobId> {
    let jobs = client.list_jobs(plan).await?;
    let matches: Vec<_> =
        jobs.iter().filter(|j| j.id.to_string() == query || j.id.to_string().starts_with(query)).collect();
    match matches.as_slice() {
        [one] => Ok(one.id),
        [] => anyhow::bail!("no job found matching '{}'", query),
        many => {
            let ids: Vec<String> = many.iter().map(|j| j.id.to_string()).collect();
            anyhow::bail!("ambiguous job id '{}' matches: {}", query, ids.join(", "))
        }
    }
    .with_context(|| format!("resolving job id '{query}' in plan '{plan}'"))
}
