use crate::errors::ServiceError;
use crate::progress::rule::StepList;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Per-step percent-complete map of a work item.
///
/// Keys are step names of the bound rule of credit; values are percents in
/// [0, 100]. Persisted as a JSON object column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct ProgressMap(pub BTreeMap<String, f64>);

impl ProgressMap {
    pub fn get(&self, step: &str) -> Option<f64> {
        self.0.get(step).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Records a percent for a known step.
    ///
    /// Fails when `percent` is outside [0, 100] or `step` is not part of
    /// `steps`; the map is left untouched on failure. Recomputation of earned
    /// values is a separate, explicit operation so callers can batch several
    /// step updates before recomputing once.
    pub fn update_step(
        &mut self,
        steps: &StepList,
        step: &str,
        percent: f64,
    ) -> Result<(), ServiceError> {
        if !percent.is_finite() || percent < 0.0 || percent > 100.0 {
            return Err(ServiceError::ValidationError(format!(
                "Percent complete {} is outside [0, 100]",
                percent
            )));
        }
        if !steps.contains(step) {
            return Err(ServiceError::ValidationError(format!(
                "Unknown step '{}' for this rule of credit",
                step
            )));
        }
        self.0.insert(step.to_string(), percent);
        Ok(())
    }
}

/// Derived earned figures of a single work item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EarnedValues {
    pub earned_man_hours: f64,
    pub earned_quantity: f64,
}

/// Fresh progress map for a rule: one zero entry per step.
///
/// An item whose cost code carries no rule gets an empty map; its overall
/// percent and earned values stay at zero.
pub fn initial_progress(steps: &StepList) -> ProgressMap {
    ProgressMap(
        steps
            .steps()
            .iter()
            .map(|step| (step.name.clone(), 0.0))
            .collect(),
    )
}

/// Overall percent complete: Σ (weight/100 × percent) over the rule's steps.
///
/// Steps missing from the progress map count as zero. With weights summing to
/// 100 and percents in [0, 100] the result lies in [0, 100] by construction.
pub fn overall_percent(steps: &StepList, progress: &ProgressMap) -> f64 {
    steps
        .steps()
        .iter()
        .map(|step| step.weight / 100.0 * progress.get(&step.name).unwrap_or(0.0))
        .sum()
}

/// Earned values for an overall percent against optional budgets.
///
/// This is the sole producer of earned figures: an unset budget earns zero,
/// and a set budget earns `budget × percent / 100`, which keeps earned ≤
/// budgeted for any percent in [0, 100].
pub fn earned_values(
    overall_percent: f64,
    budgeted_man_hours: Option<f64>,
    budgeted_quantity: Option<f64>,
) -> EarnedValues {
    EarnedValues {
        earned_man_hours: budgeted_man_hours.unwrap_or(0.0) * overall_percent / 100.0,
        earned_quantity: budgeted_quantity.unwrap_or(0.0) * overall_percent / 100.0,
    }
}
