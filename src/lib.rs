//! Brew Engine: the timing core of a pour-over brewing companion
//!
//! The engine follows a "pure core, imperative shell" split. The core maps
//! a recipe and an elapsed time onto the pour step in progress with plain
//! functions. The shell is a precision clock running on its own thread,
//! so rendering or a blocked UI never holds back the brew timer.
//!
//! # Core Concepts
//!
//! - **Recipe**: dose, ratio and the ordered pour steps
//! - **Precision clock**: start/pause/reset/sync commands in, absolute
//!   elapsed-time samples out
//! - **Step machine**: active step, step progress, target water and the
//!   finished flag, recomputed from every sample
//! - **Session**: the two wired together, with snapshots for resuming
//!
//! # Example
//!
//! ```rust
//! use brew_engine::core::{project, Recipe, RecipeStep};
//!
//! let recipe = Recipe::new(
//!     15.0,
//!     16.0,
//!     vec![
//!         RecipeStep::new("Bloom", 20.0, 45),
//!         RecipeStep::new("Pour", 40.0, 45),
//!         RecipeStep::new("Pour", 40.0, 45),
//!     ],
//! );
//!
//! let output = project(&recipe, 45.0);
//! assert_eq!(output.step_index, 1);
//! assert_eq!(output.cumulative_target_volume, 144.0);
//! ```

pub mod clock;
pub mod core;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use self::clock::{ClockCommand, ClockConfig, ClockSample, PrecisionClock};
pub use self::core::{project, BrewStepMachine, Recipe, RecipeStep, StepMachineOutput};
pub use self::session::{BrewSession, BrewView, SessionError};
