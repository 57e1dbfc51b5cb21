// SPDX-License-Identifier: MIT

//! `oj status` — plan-wide counts from [`Request::Status`](oj_wire::Request::Status).

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

pub async fn handle(client: &mut DaemonClient, format: OutputFormat) -> Result<()> {
    let statuses = client.status().await?;

    format_or_json(format, &statuses, || {
        if statuses.is_empty() {
            println!("No plans tracked");
            return;
        }
        for plan in &statuses {
            println!(
                "{}  running={} ready={} blocked={} completed={} failed={}",
                crate::color::header(&plan.plan),
                plan.running.len(),
                plan.ready.len(),
                plan.blocked,
                plan.completed,
                plan.failed,
            );
        }
    })
}
