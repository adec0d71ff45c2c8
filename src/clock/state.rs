//! Clock state and the pure command transitions applied to it.
//!
//! Nothing here reads the time itself: every operation takes `now`, so the
//! worker thread and the tests drive it the same way.

use crate::core::State;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Commands accepted by the precision clock.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClockCommand {
    Start,
    Pause,
    Reset,
    /// Overwrite the accumulated time with an authoritative value
    Sync { value_ms: f64 },
}

/// Where the clock stands. Only construction and `Reset` leave it `Idle`;
/// a stopped clock that has run or been synced is `Paused`, even at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockPhase {
    #[default]
    Idle,
    Running,
    Paused,
}

impl State for ClockPhase {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Paused => "Paused",
        }
    }
}

/// One elapsed-time measurement emitted by the clock.
///
/// Each sample is absolute, so a consumer that skips samples loses nothing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockSample {
    pub elapsed_ms: f64,
    pub running: bool,
    /// Number of `Reset` and `Sync` commands applied before this sample
    pub epoch: u64,
}

impl ClockSample {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }
}

/// Elapsed-time bookkeeping owned by the clock worker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClockState {
    accumulated_ms: f64,
    started_at: Option<Instant>,
    phase: ClockPhase,
    epoch: u64,
}

impl ClockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time banked while running, excluding the current run segment.
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// Bumped by every `Reset` and `Sync` command, so consumers can tell
    /// samples taken before a rewind from samples taken after it.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// `accumulated + (now - t0)`, derived from timestamps only.
    pub fn elapsed_ms(&self, now: Instant) -> f64 {
        match self.started_at {
            Some(t0) => self.accumulated_ms + since_ms(t0, now),
            None => self.accumulated_ms,
        }
    }

    pub fn sample(&self, now: Instant) -> ClockSample {
        ClockSample {
            elapsed_ms: self.elapsed_ms(now),
            running: self.is_running(),
            epoch: self.epoch,
        }
    }

    /// Apply a command. Commands that make no sense in the current phase
    /// are ignored.
    pub fn apply(&mut self, command: ClockCommand, now: Instant) {
        if matches!(command, ClockCommand::Reset | ClockCommand::Sync { .. }) {
            self.epoch += 1;
        }
        match command {
            ClockCommand::Start => self.start(now),
            ClockCommand::Pause => self.pause(now),
            ClockCommand::Reset => self.reset(),
            ClockCommand::Sync { value_ms } => self.sync(value_ms, now),
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.is_running() {
            debug!("Ignoring start: clock already running");
            return;
        }
        self.started_at = Some(now);
        self.phase = ClockPhase::Running;
    }

    pub fn pause(&mut self, now: Instant) {
        match self.started_at.take() {
            Some(t0) => {
                self.accumulated_ms += since_ms(t0, now);
                self.phase = ClockPhase::Paused;
            }
            None => debug!("Ignoring pause: clock not running"),
        }
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
        self.started_at = None;
        self.phase = ClockPhase::Idle;
    }

    /// Replace the accumulated time; when running, later deltas are measured
    /// from `now` so they add onto `value_ms`.
    pub fn sync(&mut self, value_ms: f64, now: Instant) {
        if !value_ms.is_finite() {
            warn!("Ignoring sync to non-finite value {}", value_ms);
            return;
        }
        if value_ms < 0.0 {
            warn!("Clamping negative sync value {} to zero", value_ms);
        }
        self.accumulated_ms = value_ms.max(0.0);
        if self.is_running() {
            self.started_at = Some(now);
        } else {
            self.phase = ClockPhase::Paused;
        }
    }
}

/// Milliseconds from `t0` to `now`, zero if `now` is earlier.
///
/// Whole seconds and the sub-second part are converted separately so that
/// whole-millisecond spans come out exact.
fn since_ms(t0: Instant, now: Instant) -> f64 {
    let span = now.saturating_duration_since(t0);
    span.as_secs() as f64 * 1000.0 + f64::from(span.subsec_nanos()) / 1_000_000.0
}
