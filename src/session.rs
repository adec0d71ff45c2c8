//! Brew session: the consumer side of the engine.
//!
//! A [`BrewSession`] owns one [`PrecisionClock`] and one [`BrewStepMachine`].
//! Commands go straight to the clock; samples coming back are projected onto
//! the recipe whenever the caller polls. The session stops the clock itself
//! once the last step has run out.

use crate::clock::{ClockConfig, ClockError, ClockSample, PrecisionClock, TimeSource};
use crate::core::{
    BrewStatus, BrewStepMachine, Recipe, RecipeError, StateHistory, StateTransition,
    StepMachineOutput, StepTransition,
};
use crate::snapshot::{SessionSnapshot, SnapshotError};
use chrono::Utc;
use log::{debug, info};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by [`BrewSession`] setup and restore.
///
/// Run-time commands never fail.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidRecipe(#[from] RecipeError),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Everything a UI needs to draw the current moment of a brew.
#[derive(Clone, Debug, PartialEq)]
pub struct BrewView {
    pub elapsed_ms: f64,
    pub running: bool,
    pub output: StepMachineOutput,
    pub status: BrewStatus,
    pub step_name: String,
    /// Water the active step adds on top of the previous steps
    pub step_added_volume: f64,
    pub total_water: f64,
}

/// A live brew.
///
/// # Example
///
/// ```rust
/// use brew_engine::clock::{ClockConfig, ManualTimeSource};
/// use brew_engine::core::Recipe;
/// use brew_engine::session::BrewSession;
/// use std::time::Duration;
///
/// let time = ManualTimeSource::new();
/// let mut session =
///     BrewSession::with_time_source(Recipe::default(), ClockConfig::default(), time).unwrap();
///
/// // Resume a brew that was 50 seconds in.
/// session.sync(50_000.0);
///
/// let view = session.wait(Duration::from_secs(1));
/// assert_eq!(view.output.step_index, 1);
/// assert_eq!(view.step_name, "First Pour");
/// ```
pub struct BrewSession {
    clock: PrecisionClock,
    machine: BrewStepMachine,
    running: bool,
    elapsed_ms: f64,
    /// Samples older than this epoch predate the last rewind
    epoch: u64,
    status: BrewStatus,
    history: StateHistory<BrewStatus>,
}

impl BrewSession {
    /// Start a session on the system clock.
    pub fn new(recipe: Recipe, config: ClockConfig) -> Result<Self, SessionError> {
        recipe.ensure_valid()?;
        let clock = PrecisionClock::spawn(config)?;
        Ok(Self::assemble(recipe, clock))
    }

    /// Start a session reading time from `source`.
    pub fn with_time_source<T: TimeSource>(
        recipe: Recipe,
        config: ClockConfig,
        source: T,
    ) -> Result<Self, SessionError> {
        recipe.ensure_valid()?;
        let clock = PrecisionClock::spawn_with_source(config, source)?;
        Ok(Self::assemble(recipe, clock))
    }

    fn assemble(recipe: Recipe, clock: PrecisionClock) -> Self {
        Self {
            clock,
            machine: BrewStepMachine::new(recipe),
            running: false,
            elapsed_ms: 0.0,
            epoch: 0,
            status: BrewStatus::Ready,
            history: StateHistory::new(),
        }
    }

    pub fn recipe(&self) -> &Recipe {
        self.machine.recipe()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.machine.is_finished()
    }

    pub fn history(&self) -> &StateHistory<BrewStatus> {
        &self.history
    }

    /// Start or resume the brew. Ignored once the brew has finished.
    pub fn start(&mut self) {
        if self.machine.is_finished() {
            debug!("Ignoring start: brew already finished");
            return;
        }
        self.clock.start();
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.clock.pause();
        self.running = false;
    }

    /// Flip between running and paused. Ignored once the brew has finished.
    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Back to the first step with the clock at zero.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.rewind();
    }

    /// Overwrite the clock reading. Running sessions keep running from it.
    pub fn sync(&mut self, value_ms: f64) {
        self.clock.sync(value_ms);
        self.epoch += 1;
    }

    /// Swap in a recipe.
    ///
    /// Returns `true` when the recipe is a different one and the brew was
    /// reset, `false` when it was an in-place edit.
    pub fn load_recipe(&mut self, recipe: Recipe) -> Result<bool, SessionError> {
        recipe.ensure_valid()?;
        match self.machine.load_recipe(recipe) {
            Some(command) => {
                self.clock.send(command);
                self.rewind();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply the newest pending sample, if any, and describe the brew.
    pub fn poll(&mut self) -> BrewView {
        if let Some(sample) = self.clock.latest_sample_since(self.epoch) {
            self.apply_sample(sample);
        }
        self.view()
    }

    /// Like [`poll`](Self::poll), but waits up to `timeout` for a sample.
    pub fn wait(&mut self, timeout: Duration) -> BrewView {
        if let Some(sample) = self.clock.wait_latest_since(self.epoch, timeout) {
            self.apply_sample(sample);
        }
        self.view()
    }

    /// Current view without consuming samples.
    pub fn view(&self) -> BrewView {
        let output = self.machine.output_at(self.elapsed_ms / 1000.0);
        let recipe = self.machine.recipe();
        BrewView {
            elapsed_ms: self.elapsed_ms,
            running: self.running,
            output,
            status: self.status.clone(),
            step_name: recipe.steps[output.step_index].name.clone(),
            step_added_volume: recipe.step_water(output.step_index),
            total_water: recipe.total_water(),
        }
    }

    /// Capture the session for a later [`restore`](Self::restore).
    pub fn snapshot(&mut self) -> SessionSnapshot {
        self.poll();
        SessionSnapshot::new(
            self.machine.recipe().signature(),
            self.elapsed_ms,
            self.running,
            self.machine.is_finished(),
            self.history.clone(),
        )
    }

    /// Resume from a snapshot taken for the same recipe.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) -> Result<BrewView, SessionError> {
        snapshot.validate()?;
        let expected = self.machine.recipe().signature();
        if snapshot.recipe != expected {
            return Err(SnapshotError::RecipeMismatch {
                expected,
                found: snapshot.recipe.clone(),
            }
            .into());
        }

        self.clock.pause();
        self.sync(snapshot.elapsed_ms);

        self.machine.reset();
        self.elapsed_ms = snapshot.elapsed_ms;
        let secs = snapshot.elapsed_ms / 1000.0;
        self.machine.advance(secs);
        if snapshot.finished && !self.machine.is_finished() {
            let total = self.machine.recipe().total_duration() as f64;
            self.machine.advance(total);
        }
        self.history = snapshot.history.clone();
        self.status = self.machine.status(secs);

        self.running = false;
        if snapshot.running && !self.machine.is_finished() {
            self.start();
        }

        info!(
            "Restored snapshot {} at {:.1}s ({})",
            snapshot.id,
            secs,
            if self.running { "running" } else { "paused" }
        );
        Ok(self.view())
    }

    fn rewind(&mut self) {
        self.machine.reset();
        self.running = false;
        self.elapsed_ms = 0.0;
        self.epoch += 1;
        self.set_status(BrewStatus::Ready);
    }

    fn apply_sample(&mut self, sample: ClockSample) {
        self.elapsed_ms = sample.elapsed_ms;
        let secs = sample.elapsed_secs();
        let advance = self.machine.advance(secs);

        if advance.transition == Some(StepTransition::Finished) && self.running {
            self.clock.pause();
            self.running = false;
        }

        let status = self.machine.status(secs);
        self.set_status(status);
    }

    fn set_status(&mut self, status: BrewStatus) {
        if status != self.status {
            let from = std::mem::replace(&mut self.status, status.clone());
            self.history = self.history.record(StateTransition {
                from,
                to: status,
                timestamp: Utc::now(),
                elapsed_ms: self.elapsed_ms,
            });
        }
    }
}
