//! Mapping elapsed brew time onto recipe steps.
//!
//! [`project`] is a pure function of `(recipe, elapsed)`. It is recomputed
//! from scratch on every tick and never patched incrementally, so it cannot
//! drift from the clock.

use super::recipe::Recipe;
use serde::{Deserialize, Serialize};

/// Where a brew stands at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepMachineOutput {
    /// Active step, always a valid index into `recipe.steps`
    pub step_index: usize,
    /// Fraction of the active step's duration elapsed, in `[0, 1]`
    pub step_progress: f64,
    /// Water that should be in the brewer by the end of the active step
    pub cumulative_target_volume: f64,
    pub finished: bool,
}

impl StepMachineOutput {
    /// Output for a completed brew.
    pub fn finished(recipe: &Recipe) -> Self {
        Self {
            step_index: recipe.steps.len().saturating_sub(1),
            step_progress: 1.0,
            cumulative_target_volume: recipe.total_water(),
            finished: true,
        }
    }
}

/// Project `elapsed_secs` onto `recipe`.
///
/// A sample exactly on a step boundary belongs to the step that starts
/// there. Negative elapsed values are treated as the very start of the brew.
///
/// # Panics
///
/// Panics if `recipe.steps` is empty. Callers must validate recipes first.
///
/// # Example
///
/// ```rust
/// use brew_engine::core::{project, Recipe};
///
/// let recipe = Recipe::default();
///
/// let at_boundary = project(&recipe, 45.0);
/// assert_eq!(at_boundary.step_index, 1);
/// assert_eq!(at_boundary.step_progress, 0.0);
/// assert_eq!(at_boundary.cumulative_target_volume, 144.0);
///
/// assert!(project(&recipe, 135.0).finished);
/// ```
pub fn project(recipe: &Recipe, elapsed_secs: f64) -> StepMachineOutput {
    project_with_thresholds(recipe, &recipe.thresholds(), elapsed_secs)
}

/// [`project`] with thresholds already computed by [`Recipe::thresholds`].
pub(crate) fn project_with_thresholds(
    recipe: &Recipe,
    thresholds: &[f64],
    elapsed_secs: f64,
) -> StepMachineOutput {
    assert!(
        !recipe.steps.is_empty(),
        "brew recipe must contain at least one step"
    );

    let total = thresholds[thresholds.len() - 1];
    if elapsed_secs >= total {
        return StepMachineOutput::finished(recipe);
    }

    // Strict `<` so a boundary sample advances to the next step.
    let step_index = thresholds
        .iter()
        .position(|&threshold| elapsed_secs < threshold)
        .unwrap_or(thresholds.len() - 1);

    let previous = if step_index == 0 {
        0.0
    } else {
        thresholds[step_index - 1]
    };
    let duration = f64::from(recipe.steps[step_index].duration);
    let step_progress = ((elapsed_secs - previous) / duration).clamp(0.0, 1.0);

    let cumulative_target_volume = (0..=step_index).map(|j| recipe.step_water(j)).sum();

    StepMachineOutput {
        step_index,
        step_progress,
        cumulative_target_volume,
        finished: false,
    }
}
