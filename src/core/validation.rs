//! Recipe precondition checks.
//!
//! The step machine assumes a non-empty step list with positive durations
//! and does not repair bad input. Callers run these checks first. All
//! violations are accumulated with `Validation` so a recipe editor can
//! report every problem in a single pass.

use super::recipe::Recipe;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Outcome of recipe checks, carrying every violation found
pub type RecipeCheck = Validation<(), NonEmptyVec<RecipeViolation>>;

/// A single reason a recipe cannot drive a brew session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecipeViolation {
    #[error("Recipe has no steps")]
    NoSteps,

    #[error("Step {index} ({name}) has a zero duration")]
    ZeroDuration { index: usize, name: String },

    #[error("Bean weight must be positive (got {value})")]
    BeanWeightNotPositive { value: f64 },

    #[error("Ratio must be positive (got {value})")]
    RatioNotPositive { value: f64 },

    #[error("Step {index} has an invalid water percentage ({value})")]
    InvalidWaterPercentage { index: usize, value: f64 },
}

/// Error returned when an invalid recipe is handed to the engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecipeError {
    #[error("Invalid recipe: {}", join_violations(.0))]
    Invalid(Vec<RecipeViolation>),
}

fn join_violations(violations: &[RecipeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn check(ok: bool, violation: impl FnOnce() -> RecipeViolation) -> RecipeCheck {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

impl Recipe {
    /// Check every engine precondition, accumulating ALL violations.
    ///
    /// Percentages are not required to sum to 100.
    ///
    /// # Example
    ///
    /// ```rust
    /// use brew_engine::core::{Recipe, RecipeStep};
    /// use stillwater::validation::Validation;
    ///
    /// let recipe = Recipe::new(0.0, 16.0, vec![RecipeStep::new("Bloom", 20.0, 0)]);
    ///
    /// match recipe.validate() {
    ///     Validation::Failure(errors) => assert_eq!(errors.len(), 2),
    ///     Validation::Success(_) => panic!("expected violations"),
    /// }
    /// ```
    pub fn validate(&self) -> RecipeCheck {
        let mut checks = vec![
            check(self.bean_weight.is_finite() && self.bean_weight > 0.0, || {
                RecipeViolation::BeanWeightNotPositive {
                    value: self.bean_weight,
                }
            }),
            check(self.ratio.is_finite() && self.ratio > 0.0, || {
                RecipeViolation::RatioNotPositive { value: self.ratio }
            }),
            check(!self.steps.is_empty(), || RecipeViolation::NoSteps),
        ];

        for (index, step) in self.steps.iter().enumerate() {
            checks.push(check(step.duration > 0, || RecipeViolation::ZeroDuration {
                index,
                name: step.name.clone(),
            }));
            checks.push(check(
                step.water_percentage.is_finite() && step.water_percentage >= 0.0,
                || RecipeViolation::InvalidWaterPercentage {
                    index,
                    value: step.water_percentage,
                },
            ));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// [`Recipe::validate`] folded into a `Result`.
    pub fn ensure_valid(&self) -> Result<(), RecipeError> {
        match self.validate() {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => {
                Err(RecipeError::Invalid(errors.iter().cloned().collect()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecipeStep;

    #[test]
    fn default_recipe_is_valid() {
        assert!(Recipe::default().ensure_valid().is_ok());
    }

    #[test]
    fn percentages_need_not_sum_to_one_hundred() {
        let recipe = Recipe::new(
            15.0,
            16.0,
            vec![RecipeStep::new("Bloom", 10.0, 30), RecipeStep::new("Pour", 50.0, 60)],
        );
        assert!(recipe.ensure_valid().is_ok());
    }

    #[test]
    fn empty_steps_are_rejected() {
        let recipe = Recipe::new(15.0, 16.0, Vec::new());
        assert_eq!(
            recipe.ensure_valid(),
            Err(RecipeError::Invalid(vec![RecipeViolation::NoSteps]))
        );
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let recipe = Recipe::new(
            -1.0,
            0.0,
            vec![
                RecipeStep::new("Bloom", 20.0, 0),
                RecipeStep::new("Pour", f64::NAN, 45),
            ],
        );

        match recipe.validate() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, RecipeViolation::BeanWeightNotPositive { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, RecipeViolation::RatioNotPositive { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, RecipeViolation::ZeroDuration { index: 0, .. })));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    RecipeViolation::InvalidWaterPercentage { index: 1, .. }
                )));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn error_message_lists_violations() {
        let recipe = Recipe::new(15.0, 16.0, vec![RecipeStep::new("Bloom", 20.0, 0)]);
        let message = recipe.ensure_valid().unwrap_err().to_string();
        assert!(message.contains("Step 0 (Bloom) has a zero duration"));
    }
}
