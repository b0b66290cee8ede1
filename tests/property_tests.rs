//! Property-based tests for the earned-value core.
//!
//! These use proptest to verify the bounds and monotonicity invariants of
//! the progress computation across a wide range of rules and progress maps.

use evtrack_api::progress::{
    aggregate, earned_values, initial_progress, overall_percent, RuleStep, StepList,
    WorkItemFigures,
};
use proptest::prelude::*;

/// Rules with 1..=6 steps whose weights are normalized to sum to exactly 100.
fn rule_strategy() -> impl Strategy<Value = StepList> {
    prop::collection::vec(0.1f64..100.0, 1..=6).prop_map(|raw| {
        let sum: f64 = raw.iter().sum();
        let steps = raw
            .iter()
            .enumerate()
            .map(|(i, w)| RuleStep {
                name: format!("step-{}", i),
                weight: w / sum * 100.0,
            })
            .collect::<Vec<_>>();
        StepList::new(steps).expect("normalized weights sum to 100")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn overall_percent_stays_in_bounds(rule in rule_strategy(), seed in 0.0f64..=100.0) {
        let mut progress = initial_progress(&rule);
        // Push one arbitrary step to the seed value
        let first = rule.steps()[0].name.clone();
        progress.update_step(&rule, &first, seed).unwrap();

        let overall = overall_percent(&rule, &progress);
        prop_assert!((0.0..=100.0 + 1e-9).contains(&overall),
            "overall {} out of bounds", overall);
    }

    #[test]
    fn fully_complete_rules_earn_the_full_budget(rule in rule_strategy(), budget in 0.0f64..10_000.0) {
        let mut progress = initial_progress(&rule);
        for step in rule.steps() {
            let name = step.name.clone();
            progress.update_step(&rule, &name, 100.0).unwrap();
        }

        let overall = overall_percent(&rule, &progress);
        prop_assert!((overall - 100.0).abs() < 1e-6);

        let earned = earned_values(overall, Some(budget), None);
        prop_assert!((earned.earned_man_hours - budget).abs() < budget.abs() * 1e-9 + 1e-6);
    }

    #[test]
    fn raising_one_step_weakly_increases_overall(
        rule in rule_strategy(),
        index in any::<prop::sample::Index>(),
        low in 0.0f64..=100.0,
        bump in 0.0f64..=100.0,
    ) {
        let step = index.get(rule.steps()).name.clone();
        let high = (low + bump).min(100.0);

        let mut progress = initial_progress(&rule);
        progress.update_step(&rule, &step, low).unwrap();
        let before = overall_percent(&rule, &progress);

        progress.update_step(&rule, &step, high).unwrap();
        let after = overall_percent(&rule, &progress);

        prop_assert!(after + 1e-9 >= before);
    }

    #[test]
    fn earned_never_exceeds_budget(
        rule in rule_strategy(),
        budget_hours in 0.0f64..10_000.0,
        budget_qty in 0.0f64..10_000.0,
    ) {
        let mut progress = initial_progress(&rule);
        for step in rule.steps() {
            let name = step.name.clone();
            progress.update_step(&rule, &name, 100.0).unwrap();
        }

        let overall = overall_percent(&rule, &progress);
        let earned = earned_values(overall, Some(budget_hours), Some(budget_qty));
        prop_assert!(earned.earned_man_hours <= budget_hours + budget_hours * 1e-9 + 1e-6);
        prop_assert!(earned.earned_quantity <= budget_qty + budget_qty * 1e-9 + 1e-6);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn aggregation_percent_is_bounded_by_item_percents(
        budgets in prop::collection::vec(0.0f64..1_000.0, 1..12),
        fractions in prop::collection::vec(0.0f64..=1.0, 12),
    ) {
        let figures: Vec<WorkItemFigures> = budgets
            .iter()
            .zip(fractions.iter())
            .map(|(budget, fraction)| WorkItemFigures {
                budgeted_man_hours: Some(*budget),
                earned_man_hours: budget * fraction,
                budgeted_quantity: None,
                earned_quantity: 0.0,
            })
            .collect();

        let totals = aggregate(&figures);
        prop_assert!(totals.overall_progress_percent >= -1e-9);
        prop_assert!(totals.overall_progress_percent <= 100.0 + 1e-6);
        prop_assert!(totals.overall_progress_percent.is_finite());
    }
}
