//! Stateful wrapper around the step projection.

use super::recipe::{Recipe, RecipeSignature};
use super::state::State;
use super::steps::{project_with_thresholds, StepMachineOutput};
use crate::clock::ClockCommand;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Coarse phase of a brew, as recorded in the brew log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BrewStatus {
    /// Loaded, nothing poured yet
    Ready,
    Brewing { step: usize },
    Finished,
}

impl State for BrewStatus {
    fn name(&self) -> &str {
        match self {
            Self::Ready => "Ready",
            Self::Brewing { .. } => "Brewing",
            Self::Finished => "Finished",
        }
    }

    fn is_final(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Change observed by a single [`BrewStepMachine::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepTransition {
    StepChanged { from: usize, to: usize },
    Finished,
}

/// Result of [`BrewStepMachine::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepAdvance {
    pub output: StepMachineOutput,
    pub transition: Option<StepTransition>,
}

/// Tracks the active step of one recipe across clock samples.
///
/// Every sample is projected from scratch. The only state carried between
/// samples is the last step index (to report transitions) and the
/// finished latch, which holds until [`reset`](Self::reset) or a recipe swap.
///
/// # Example
///
/// ```rust
/// use brew_engine::clock::ClockCommand;
/// use brew_engine::core::{BrewStepMachine, Recipe, StepTransition};
///
/// let mut machine = BrewStepMachine::new(Recipe::default().with_name("V60"));
///
/// let advance = machine.advance(50.0);
/// assert_eq!(advance.output.step_index, 1);
/// assert_eq!(advance.transition, Some(StepTransition::StepChanged { from: 0, to: 1 }));
///
/// let swapped = machine.load_recipe(Recipe::default().with_name("Hot Bloom"));
/// assert_eq!(swapped, Some(ClockCommand::Reset));
/// assert_eq!(machine.step_index(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct BrewStepMachine {
    recipe: Recipe,
    signature: RecipeSignature,
    thresholds: Vec<f64>,
    step_index: usize,
    finished: bool,
}

impl BrewStepMachine {
    /// Create a machine for `recipe`.
    ///
    /// The recipe must satisfy [`Recipe::validate`]; the machine does not
    /// check it again.
    pub fn new(recipe: Recipe) -> Self {
        Self {
            signature: recipe.signature(),
            thresholds: recipe.thresholds(),
            recipe,
            step_index: 0,
            finished: false,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Output for the current position without a new sample.
    pub fn output_at(&self, elapsed_secs: f64) -> StepMachineOutput {
        if self.finished {
            StepMachineOutput::finished(&self.recipe)
        } else {
            project_with_thresholds(&self.recipe, &self.thresholds, elapsed_secs)
        }
    }

    /// Status derived from the latest projection.
    pub fn status(&self, elapsed_secs: f64) -> BrewStatus {
        if self.finished {
            BrewStatus::Finished
        } else if elapsed_secs <= 0.0 && self.step_index == 0 {
            BrewStatus::Ready
        } else {
            BrewStatus::Brewing {
                step: self.step_index,
            }
        }
    }

    /// Apply a clock sample, in seconds.
    pub fn advance(&mut self, elapsed_secs: f64) -> StepAdvance {
        if self.finished {
            return StepAdvance {
                output: StepMachineOutput::finished(&self.recipe),
                transition: None,
            };
        }

        let output = project_with_thresholds(&self.recipe, &self.thresholds, elapsed_secs);
        let transition = if output.finished {
            self.finished = true;
            info!(
                "Brew finished after {:.1}s ({:.0}g poured)",
                elapsed_secs, output.cumulative_target_volume
            );
            Some(StepTransition::Finished)
        } else if output.step_index != self.step_index {
            let from = self.step_index;
            info!(
                "Step {} -> {} ({}) at {:.1}s",
                from, output.step_index, self.recipe.steps[output.step_index].name, elapsed_secs
            );
            Some(StepTransition::StepChanged {
                from,
                to: output.step_index,
            })
        } else {
            None
        };
        self.step_index = output.step_index;

        StepAdvance { output, transition }
    }

    /// Swap in a recipe.
    ///
    /// A recipe with a different signature is a new brew: the machine
    /// rewinds to the first step and asks the clock to reset. A recipe with
    /// the same signature is an edit of the current one and is applied
    /// without touching the clock.
    pub fn load_recipe(&mut self, recipe: Recipe) -> Option<ClockCommand> {
        let signature = recipe.signature();
        let replaced = signature != self.signature;

        self.thresholds = recipe.thresholds();
        self.recipe = recipe;
        self.signature = signature;

        if replaced {
            info!(
                "Recipe changed to {:?} ({} steps), resetting brew",
                self.signature.name, self.signature.step_count
            );
            self.reset();
            Some(ClockCommand::Reset)
        } else {
            debug!("Recipe edited in place, keeping brew position");
            None
        }
    }

    /// Rewind to the first step and clear the finished latch.
    pub fn reset(&mut self) {
        self.step_index = 0;
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecipeStep;

    fn machine() -> BrewStepMachine {
        BrewStepMachine::new(Recipe::default().with_name("Standard V60"))
    }

    #[test]
    fn advance_reports_step_changes() {
        let mut machine = machine();

        assert_eq!(machine.advance(10.0).transition, None);
        assert_eq!(
            machine.advance(45.0).transition,
            Some(StepTransition::StepChanged { from: 0, to: 1 })
        );
        assert_eq!(machine.advance(60.0).transition, None);
        assert_eq!(machine.step_index(), 1);
    }

    #[test]
    fn skipped_steps_report_single_change() {
        let mut machine = machine();
        assert_eq!(
            machine.advance(100.0).transition,
            Some(StepTransition::StepChanged { from: 0, to: 2 })
        );
    }

    #[test]
    fn finished_is_a_one_shot_latch() {
        let mut machine = machine();

        let done = machine.advance(135.0);
        assert_eq!(done.transition, Some(StepTransition::Finished));
        assert!(done.output.finished);

        // A later, smaller sample does not un-finish the brew.
        let after = machine.advance(20.0);
        assert_eq!(after.transition, None);
        assert!(after.output.finished);
        assert_eq!(after.output.step_index, 2);
        assert_eq!(after.output.step_progress, 1.0);
    }

    #[test]
    fn reset_clears_latch() {
        let mut machine = machine();
        machine.advance(200.0);
        machine.reset();

        assert!(!machine.is_finished());
        assert_eq!(machine.step_index(), 0);
        assert_eq!(machine.advance(0.0).output.step_index, 0);
    }

    #[test]
    fn different_step_count_requests_clock_reset() {
        let mut machine = machine();
        machine.advance(136.0);

        let mut shorter = Recipe::default().with_name("Standard V60");
        shorter.steps.pop();

        assert_eq!(machine.load_recipe(shorter), Some(ClockCommand::Reset));
        assert_eq!(machine.step_index(), 0);
        assert!(!machine.is_finished());
        assert_eq!(machine.recipe().steps.len(), 2);
    }

    #[test]
    fn cosmetic_edit_keeps_position() {
        let mut machine = machine();
        machine.advance(50.0);

        let mut edited = Recipe::default().with_name("Standard V60");
        edited.steps[0].water_percentage = 30.0;
        edited.steps[1].water_percentage = 30.0;

        assert_eq!(machine.load_recipe(edited), None);
        assert_eq!(machine.step_index(), 1);
        let volume = machine.advance(50.0).output.cumulative_target_volume;
        assert!((volume - 144.0).abs() < 1e-9);
    }

    #[test]
    fn edited_durations_apply_to_next_sample() {
        let mut machine = machine();
        let mut edited = Recipe::default().with_name("Standard V60");
        edited.steps[0] = RecipeStep::new("Bloom", 20.0, 30);

        assert_eq!(machine.load_recipe(edited), None);
        assert_eq!(machine.advance(30.0).output.step_index, 1);
    }

    #[test]
    fn status_follows_progress() {
        let mut machine = machine();
        assert_eq!(machine.status(0.0), BrewStatus::Ready);

        machine.advance(46.0);
        assert_eq!(machine.status(46.0), BrewStatus::Brewing { step: 1 });

        machine.advance(135.0);
        assert_eq!(machine.status(135.0), BrewStatus::Finished);
        assert!(BrewStatus::Finished.is_final());
    }
}
