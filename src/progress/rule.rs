use crate::errors::ServiceError;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// Allowed deviation of a rule's weight sum from 100, absorbing input rounding.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.1;

/// One completion milestone of a rule of credit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RuleStep {
    /// Step name, unique within its rule
    #[schema(example = "Weld")]
    pub name: String,
    /// Completion weight in percent of the whole rule
    #[schema(example = 60.0)]
    pub weight: f64,
}

/// Ordered step list of a rule of credit.
///
/// Persisted as a JSON array column; the list round-trips exactly (same
/// order, same names, same weights).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct StepList(pub Vec<RuleStep>);

impl StepList {
    /// Builds a validated step list, rejecting anything `validate_steps` rejects.
    pub fn new(steps: Vec<RuleStep>) -> Result<Self, ServiceError> {
        validate_steps(&steps)?;
        Ok(Self(steps))
    }

    /// The ordered steps, exactly as stored.
    pub fn steps(&self) -> &[RuleStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|step| step.name == name)
    }
}

/// Validates a replacement step list for a rule of credit.
///
/// Step names must be non-blank and unique within the rule, each weight must
/// lie in [0, 100], and the weights must sum to 100 within
/// [`WEIGHT_SUM_TOLERANCE`]. An empty list is rejected: a rule without steps
/// may exist transiently while authoring but must never be persisted.
pub fn validate_steps(steps: &[RuleStep]) -> Result<(), ServiceError> {
    if steps.is_empty() {
        return Err(ServiceError::ValidationError(
            "A rule of credit requires at least one step".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for step in steps {
        let name = step.name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Step names must not be blank".to_string(),
            ));
        }
        if !seen.insert(name) {
            return Err(ServiceError::ValidationError(format!(
                "Duplicate step name '{}'",
                name
            )));
        }
        if !step.weight.is_finite() || step.weight < 0.0 || step.weight > 100.0 {
            return Err(ServiceError::ValidationError(format!(
                "Step '{}' weight {} is outside [0, 100]",
                name, step.weight
            )));
        }
    }

    let sum: f64 = steps.iter().map(|step| step.weight).sum();
    if (sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ServiceError::ValidationError(format!(
            "Step weights must sum to 100 (got {})",
            sum
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str, weight: f64) -> RuleStep {
        RuleStep {
            name: name.to_string(),
            weight,
        }
    }

    #[test]
    fn accepts_steps_summing_to_one_hundred() {
        assert!(validate_steps(&[step("Fit-up", 40.0), step("Weld", 60.0)]).is_ok());
    }

    #[test]
    fn accepts_sums_within_tolerance() {
        assert!(validate_steps(&[step("A", 49.95), step("B", 50.0)]).is_ok());
        assert!(validate_steps(&[step("A", 50.05), step("B", 50.0)]).is_ok());
    }

    #[test]
    fn rejects_sums_beyond_tolerance() {
        let err = validate_steps(&[step("A", 30.0), step("B", 30.0)]).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let err = validate_steps(&[step("A", 50.2), step("B", 50.0)]).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn rejects_empty_step_list() {
        assert!(validate_steps(&[]).is_err());
    }

    #[test]
    fn rejects_blank_and_duplicate_names() {
        assert!(validate_steps(&[step("  ", 100.0)]).is_err());
        assert!(validate_steps(&[step("Weld", 50.0), step("Weld", 50.0)]).is_err());
    }

    #[test]
    fn rejects_weights_outside_range() {
        assert!(validate_steps(&[step("A", -5.0), step("B", 105.0)]).is_err());
        assert!(validate_steps(&[step("A", f64::NAN), step("B", 100.0)]).is_err());
    }

    #[test]
    fn step_list_round_trips_through_json_in_order() {
        let steps = StepList::new(vec![
            step("Design", 20.0),
            step("Procure", 30.0),
            step("Install", 50.0),
        ])
        .unwrap();

        let encoded = serde_json::to_string(&steps).unwrap();
        let decoded: StepList = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, steps);
        assert_eq!(
            decoded
                .steps()
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Design", "Procure", "Install"]
        );
    }
}
