//! Precision clock.
//!
//! A worker thread accumulates elapsed wall-clock time and emits absolute
//! samples on a fixed cadence. Elapsed time is always recomputed from
//! timestamps at emission, never by counting ticks, so late or coalesced
//! ticks cannot make the clock drift.
//!
//! - [`ClockState`]: the pure `Idle`/`Running`/`Paused` bookkeeping
//! - [`PrecisionClock`]: the threaded producer around it
//! - [`TimeSource`]: where the worker reads the time from

mod config;
mod error;
mod source;
mod state;
mod worker;

pub use config::{
    ClockConfig, DEFAULT_SAMPLE_CAPACITY, DEFAULT_THREAD_NAME, DEFAULT_TICK_INTERVAL_MS,
};
pub use error::ClockError;
pub use source::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use state::{ClockCommand, ClockPhase, ClockSample, ClockState};
pub use worker::PrecisionClock;
