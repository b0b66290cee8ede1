use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Budget/earned figures of one work item, as fed to the aggregator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorkItemFigures {
    pub budgeted_man_hours: Option<f64>,
    pub earned_man_hours: f64,
    pub budgeted_quantity: Option<f64>,
    pub earned_quantity: f64,
}

/// Summed progress figures over a collection of work items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressTotals {
    pub total_budgeted_hours: f64,
    pub total_earned_hours: f64,
    pub total_budgeted_quantity: f64,
    pub total_earned_quantity: f64,
    /// 100 × earned hours / budgeted hours; 0 when no hours are budgeted.
    /// A zero here does not distinguish "no progress" from "no budget".
    pub overall_progress_percent: f64,
}

/// Reduces work-item figures to totals and an overall progress percent.
///
/// The same reduction serves sub-job, project, and portfolio scope; only the
/// input set differs. Unset budgets count as zero, and the overall percent is
/// defined as zero when no hours are budgeted at all.
pub fn aggregate<'a, I>(items: I) -> ProgressTotals
where
    I: IntoIterator<Item = &'a WorkItemFigures>,
{
    let mut totals = ProgressTotals::default();

    for item in items {
        totals.total_budgeted_hours += item.budgeted_man_hours.unwrap_or(0.0);
        totals.total_earned_hours += item.earned_man_hours;
        totals.total_budgeted_quantity += item.budgeted_quantity.unwrap_or(0.0);
        totals.total_earned_quantity += item.earned_quantity;
    }

    if totals.total_budgeted_hours > 0.0 {
        totals.overall_progress_percent =
            100.0 * totals.total_earned_hours / totals.total_budgeted_hours;
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_budgets_and_earned_figures() {
        // One item without budgeted hours, one with 100 budgeted / 50 earned
        let items = vec![
            WorkItemFigures {
                budgeted_man_hours: None,
                earned_man_hours: 0.0,
                budgeted_quantity: None,
                earned_quantity: 0.0,
            },
            WorkItemFigures {
                budgeted_man_hours: Some(100.0),
                earned_man_hours: 50.0,
                budgeted_quantity: Some(20.0),
                earned_quantity: 10.0,
            },
        ];

        let totals = aggregate(&items);
        assert!((totals.total_budgeted_hours - 100.0).abs() < 1e-9);
        assert!((totals.total_earned_hours - 50.0).abs() < 1e-9);
        assert!((totals.overall_progress_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_budget_yields_zero_percent_not_nan() {
        let items = vec![
            WorkItemFigures::default(),
            WorkItemFigures {
                budgeted_man_hours: Some(0.0),
                ..Default::default()
            },
        ];

        let totals = aggregate(&items);
        assert_eq!(totals.overall_progress_percent, 0.0);
        assert!(totals.overall_progress_percent.is_finite());
    }

    #[test]
    fn empty_input_yields_all_zero_totals() {
        let empty: Vec<WorkItemFigures> = Vec::new();
        let totals = aggregate(&empty);
        assert_eq!(totals, ProgressTotals::default());
    }

    #[test]
    fn reduction_is_scope_independent() {
        // Aggregating the same items yields the same totals regardless of how
        // the caller scoped the collection.
        let a = WorkItemFigures {
            budgeted_man_hours: Some(40.0),
            earned_man_hours: 10.0,
            budgeted_quantity: Some(8.0),
            earned_quantity: 2.0,
        };
        let b = WorkItemFigures {
            budgeted_man_hours: Some(60.0),
            earned_man_hours: 30.0,
            budgeted_quantity: Some(12.0),
            earned_quantity: 6.0,
        };

        let forward = aggregate(vec![&a, &b]);
        let reverse = aggregate(vec![&b, &a]);
        assert_eq!(forward, reverse);
        assert!((forward.overall_progress_percent - 40.0).abs() < 1e-9);
    }
}
