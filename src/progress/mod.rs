//! Earned-value progress core.
//!
//! A cost code may carry a rule of credit: an ordered, weighted list of
//! completion steps. Work items bound to that cost code record a percent
//! complete per step; the engine converts those into an overall percent and
//! earned man-hours/quantity against the item's budgets, and the aggregator
//! reduces earned figures across any collection of work items.

pub mod aggregate;
pub mod engine;
pub mod rule;

pub use aggregate::{aggregate, ProgressTotals, WorkItemFigures};
pub use engine::{earned_values, initial_progress, overall_percent, EarnedValues, ProgressMap};
pub use rule::{validate_steps, RuleStep, StepList, WEIGHT_SUM_TOLERANCE};
