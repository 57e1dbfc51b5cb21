// SPDX-License-Identifier: MIT

//! `oj resolve` — load a plan directly off disk and print its dependency
//! order / ready set (spec.md §4.3 Dependency Graph). Needs no daemon: the
//! graph is pure, in-memory computation over a plan snapshot.

use anyhow::Result;
use oj_core::graph::{DependencyGraph, ReadyPolicy};
use std::path::Path;

use crate::output::{format_or_json, OutputFormat};

pub fn handle(plan_dir: &Path, ready_policy: ReadyPolicy, format: OutputFormat) -> Result<()> {
    let mut plan = oj_storage::load_plan(plan_dir)?;
    let resolved = plan.resolve_all_dependencies();
    let graph = DependencyGraph::build(plan.jobs(), &resolved)?;
    let (ready, _blocked) = graph.ready_set(plan.jobs(), ready_policy);

    #[derive(serde::Serialize)]
    struct ResolveReport {
        order: Vec<String>,
        ready: Vec<String>,
    }

    let order: Vec<String> = graph
        .order()
        .iter()
        .filter_map(|id| plan.job(*id).map(|j| j.filename.clone()))
        .collect();
    let ready_filenames: Vec<String> =
        ready.iter().filter_map(|id| plan.job(*id).map(|j| j.filename.clone())).collect();

    let report = ResolveReport { order, ready: ready_filenames };

    format_or_json(format, &report, || {
        println!("Dependency order:");
        for filename in &report.order {
            println!("  {filename}");
        }
        println!("\nReady now:");
        if report.ready.is_empty() {
            println!("  (none)");
        }
        for filename in &report.ready {
            println!("  {filename}");
        }
    })
}
