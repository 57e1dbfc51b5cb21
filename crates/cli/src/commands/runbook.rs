// SPDX-License-Identifier: MIT

//! `oj runbook` — Template & Recipe Store lookups (spec.md §4.5). Resolves
//! a named template against a plan's own `templates/` directory, its
//! ancestors' `.grove-plan.yml` chain, or the built-in embedded set.

use anyhow::Result;
use clap::Subcommand;
use oj_core::job::JobType;
use oj_runbook::TemplateStore;
use std::path::Path;

use crate::output::{format_or_json, OutputFormat};

#[derive(Subcommand)]
pub enum RunbookCommand {
    /// Print the default template name for each job type.
    Defaults,
    /// Resolve and print a template's contents by name.
    Show {
        /// Template name, e.g. "oneshot" or a plan-local custom template.
        name: String,
    },
}

pub async fn handle(
    command: RunbookCommand,
    plan_dir: &Path,
    format: OutputFormat,
) -> Result<()> {
    match command {
        RunbookCommand::Defaults => {
            #[derive(serde::Serialize)]
            struct Default {
                job_type: String,
                template: &'static str,
            }
            let defaults: Vec<Default> = [
                JobType::Oneshot,
                JobType::Chat,
                JobType::HeadlessAgent,
                JobType::InteractiveAgent,
                JobType::Shell,
            ]
            .into_iter()
            .map(|t| Default { job_type: t.to_string(), template: TemplateStore::default_for_type(t) })
            .collect();

            format_or_json(format, &defaults, || {
                for d in &defaults {
                    println!("{:<18} {}", d.job_type, d.template);
                }
            })
        }
        RunbookCommand::Show { name } => {
            let store = TemplateStore::new(plan_dir);
            let contents = store.lookup(&name)?;
            format_or_json(format, &contents, || print!("{contents}"))
        }
    }
}
