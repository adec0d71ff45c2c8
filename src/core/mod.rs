//! Core brew types and logic.
//!
//! This module is the pure side of the engine:
//! - Recipes and their preconditions
//! - The projection from elapsed time onto recipe steps
//! - The step machine that tracks transitions and recipe swaps
//! - Phase history for the brew log
//!
//! Nothing here reads the clock or spawns threads.

mod history;
mod machine;
mod recipe;
mod state;
mod steps;
mod validation;

pub use history::{StateHistory, StateTransition};
pub use machine::{BrewStatus, BrewStepMachine, StepAdvance, StepTransition};
pub use recipe::{Recipe, RecipeSignature, RecipeStep};
pub use state::State;
pub use steps::{project, StepMachineOutput};
pub use validation::{RecipeCheck, RecipeError, RecipeViolation};
