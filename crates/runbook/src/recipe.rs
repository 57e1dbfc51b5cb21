// SPDX-License-Identifier: MIT

//! Template & Recipe Store, recipe half (spec.md §4.5). A recipe is a
//! named list of template-based jobs with `${VAR}` substitution;
//! `add_jobs_from_recipe` expands it into a deterministic set of new jobs,
//! wiring each job's `depends_on` to the prior recipe job and the caller's
//! external dependencies.

use crate::slug::slugify;
use crate::template::interpolate;
use std::collections::HashMap;

/// One step of a recipe: a template name plus a title pattern, both of
/// which may reference `${VAR}` placeholders.
#[derive(Debug, Clone)]
pub struct RecipeStep {
    pub template: String,
    pub title: String,
    pub body: String,
}

/// A named, parameterized set of job templates used to scaffold plans.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub steps: Vec<RecipeStep>,
}

/// A job produced by expanding a recipe, ready for the caller (the
/// orchestrator, via `oj-storage::PlanPersister::append_job`) to render
/// through the frontmatter codec and write to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedJob {
    pub filename: String,
    pub title: String,
    pub template: String,
    pub depends_on: Vec<String>,
    pub body: String,
}

/// Expand `recipe` into a deterministic sequence of [`GeneratedJob`]s.
///
/// `next_prefix` is the next available numeric filename prefix (current
/// plan max + 1, per spec.md §4.9 step f.ii). The first step depends on
/// `external_deps`; each subsequent step depends on the filename of the
/// step immediately before it.
pub fn add_jobs_from_recipe(
    recipe: &Recipe,
    next_prefix: u32,
    external_deps: &[String],
    vars: &HashMap<String, String>,
) -> Vec<GeneratedJob> {
    let mut out = Vec::with_capacity(recipe.steps.len());
    let mut previous_filename: Option<String> = None;

    for (i, step) in recipe.steps.iter().enumerate() {
        let title = interpolate(&step.title, vars);
        let body = interpolate(&step.body, vars);
        let prefix = next_prefix + i as u32;
        let filename = format!("{:02}-{}.md", prefix, slugify(&title, 40));

        let depends_on = match &previous_filename {
            Some(prev) => vec![prev.clone()],
            None => external_deps.to_vec(),
        };

        previous_filename = Some(filename.clone());
        out.push(GeneratedJob { filename, title, template: step.template.clone(), depends_on, body });
    }

    out
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
