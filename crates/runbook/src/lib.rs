// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-runbook: the Template & Recipe Store (spec.md §4.5) — named template
//! lookup with plan/ancestor/built-in search order, `${VAR}` interpolation,
//! and recipe expansion into a deterministic sequence of new jobs.

pub mod recipe;
pub mod slug;
pub mod template;
pub mod template_store;

pub use recipe::{add_jobs_from_recipe, GeneratedJob, Recipe, RecipeStep};
pub use slug::slugify;
pub use template::{escape_for_shell, interpolate, interpolate_shell};
pub use template_store::{TemplateError, TemplateStore};
