// SPDX-License-Identifier: MIT

use super::*;

fn recipe() -> Recipe {
    Recipe {
        name: "feature".into(),
        steps: vec![
            RecipeStep {
                template: "oneshot".into(),
                title: "Plan ${feature}".into(),
                body: "Plan out ${feature}.".into(),
            },
            RecipeStep {
                template: "headless_agent".into(),
                title: "Implement ${feature}".into(),
                body: "Implement ${feature} per the plan.".into(),
            },
        ],
    }
}

#[test]
fn first_step_depends_on_external_deps() {
    let vars = HashMap::from([("feature".to_string(), "login".to_string())]);
    let jobs = add_jobs_from_recipe(&recipe(), 3, &["02-spike.md".to_string()], &vars);

    assert_eq!(jobs[0].depends_on, vec!["02-spike.md".to_string()]);
    assert_eq!(jobs[0].title, "Plan login");
    assert_eq!(jobs[0].filename, "03-plan-login.md");
}

#[test]
fn later_steps_depend_on_the_prior_step() {
    let vars = HashMap::from([("feature".to_string(), "login".to_string())]);
    let jobs = add_jobs_from_recipe(&recipe(), 3, &[], &vars);

    assert_eq!(jobs[1].depends_on, vec![jobs[0].filename.clone()]);
}

#[test]
fn filenames_use_sequential_prefixes() {
    let vars = HashMap::new();
    let jobs = add_jobs_from_recipe(&recipe(), 10, &[], &vars);
    assert!(jobs[0].filename.starts_with("10-"));
    assert!(jobs[1].filename.starts_with("11-"));
}

#[test]
fn vars_interpolate_into_title_and_body() {
    let vars = HashMap::from([("feature".to_string(), "checkout".to_string())]);
    let jobs = add_jobs_from_recipe(&recipe(), 1, &[], &vars);
    assert_eq!(jobs[1].body, "Implement checkout per the plan.");
}

#[test]
fn expansion_is_deterministic() {
    let vars = HashMap::from([("feature".to_string(), "login".to_string())]);
    let a = add_jobs_from_recipe(&recipe(), 1, &[], &vars);
    let b = add_jobs_from_recipe(&recipe(), 1, &[], &vars);
    assert_eq!(a, b);
}
