//! Phase transition history.
//!
//! An immutable, ordered log of the phases a brew went through, stamped
//! with wall-clock time and with the brew clock's elapsed time.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single phase transition.
///
/// # Example
///
/// ```rust
/// use brew_engine::core::{BrewStatus, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: BrewStatus::Ready,
///     to: BrewStatus::Brewing { step: 0 },
///     timestamp: Utc::now(),
///     elapsed_ms: 0.0,
/// };
/// assert_eq!(transition.to, BrewStatus::Brewing { step: 0 });
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The phase being left
    pub from: S,
    /// The phase being entered
    pub to: S,
    /// Wall-clock time of the transition
    pub timestamp: DateTime<Utc>,
    /// Brew clock reading when the transition was observed
    pub elapsed_ms: f64,
}

/// Ordered history of phase transitions.
///
/// `record` returns a new history and leaves the original untouched.
///
/// # Example
///
/// ```rust
/// use brew_engine::core::{BrewStatus, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new();
/// let history = history.record(StateTransition {
///     from: BrewStatus::Ready,
///     to: BrewStatus::Brewing { step: 0 },
///     timestamp: Utc::now(),
///     elapsed_ms: 0.0,
/// });
/// let history = history.record(StateTransition {
///     from: BrewStatus::Brewing { step: 0 },
///     to: BrewStatus::Finished,
///     timestamp: Utc::now(),
///     elapsed_ms: 45_000.0,
/// });
///
/// assert_eq!(history.get_path().len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of phases traversed.
    ///
    /// Returns the initial phase followed by the `to` phase of each
    /// transition. Empty when nothing was recorded.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Wall-clock time between the first and last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// The most recently entered phase, if any transition was recorded.
    pub fn last_phase(&self) -> Option<&S> {
        self.transitions.last().map(|t| &t.to)
    }

    /// Get all transitions in order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
