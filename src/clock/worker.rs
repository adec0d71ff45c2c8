//! Background ticking thread.
//!
//! The worker owns the [`ClockState`]. Commands reach it over one channel
//! and samples leave over another, so the tick path takes no locks and a
//! busy consumer never holds back time accrual.
//!
//! The sample channel is bounded. When the consumer falls behind, ticks
//! that do not fit are dropped. A command's sample that does not fit is kept
//! and retried every interval until there is room; while running, the next
//! tick carries the same reading, so it is simply superseded.

use super::config::ClockConfig;
use super::error::ClockError;
use super::source::{SystemTimeSource, TimeSource};
use super::state::{ClockCommand, ClockSample, ClockState};
use log::{debug, info, warn};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

enum Message {
    Command(ClockCommand),
    Shutdown,
}

/// Handle to a running clock worker.
///
/// Dropping the handle stops the worker and joins its thread; no sample is
/// observable afterwards.
///
/// # Example
///
/// ```rust
/// use brew_engine::clock::{ClockConfig, ManualTimeSource, PrecisionClock};
/// use std::time::Duration;
///
/// let time = ManualTimeSource::new();
/// let clock = PrecisionClock::spawn_with_source(ClockConfig::default(), time.clone()).unwrap();
///
/// clock.sync(2_000.0);
/// let sample = clock.next_sample(Duration::from_secs(1)).unwrap();
/// assert_eq!(sample.elapsed_ms, 2_000.0);
/// assert!(!sample.running);
/// ```
pub struct PrecisionClock {
    commands: Sender<Message>,
    samples: Receiver<ClockSample>,
    worker: Option<JoinHandle<()>>,
}

impl PrecisionClock {
    /// Spawn a clock reading the system monotonic clock.
    pub fn spawn(config: ClockConfig) -> Result<Self, ClockError> {
        Self::spawn_with_source(config, SystemTimeSource)
    }

    /// Spawn a clock reading `source`.
    pub fn spawn_with_source<T: TimeSource>(
        config: ClockConfig,
        source: T,
    ) -> Result<Self, ClockError> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::channel();
        let (sample_tx, sample_rx) = mpsc::sync_channel(config.sample_capacity);
        let interval = config.tick_interval();

        let worker = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run(source, interval, command_rx, sample_tx))?;

        info!(
            "Clock worker '{}' started, ticking every {:?}",
            config.thread_name, interval
        );

        Ok(Self {
            commands: command_tx,
            samples: sample_rx,
            worker: Some(worker),
        })
    }

    pub fn start(&self) {
        self.send(ClockCommand::Start);
    }

    pub fn pause(&self) {
        self.send(ClockCommand::Pause);
    }

    pub fn reset(&self) {
        self.send(ClockCommand::Reset);
    }

    pub fn sync(&self, value_ms: f64) {
        self.send(ClockCommand::Sync { value_ms });
    }

    /// Forward a command to the worker. Commands are applied in send order.
    pub fn send(&self, command: ClockCommand) {
        if self.commands.send(Message::Command(command)).is_err() {
            warn!("Clock worker is gone, dropping {:?}", command);
        }
    }

    /// Newest pending sample, discarding older ones.
    pub fn latest_sample(&self) -> Option<ClockSample> {
        self.samples.try_iter().last()
    }

    /// Newest pending sample from `epoch` onwards; older ones are discarded.
    pub fn latest_sample_since(&self, epoch: u64) -> Option<ClockSample> {
        self.samples.try_iter().filter(|s| s.epoch >= epoch).last()
    }

    /// Wait up to `timeout` for a sample from `epoch` onwards, then skip to
    /// the newest pending one.
    pub fn wait_latest_since(&self, epoch: u64, timeout: Duration) -> Option<ClockSample> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let sample = self.samples.recv_timeout(remaining).ok()?;
            if sample.epoch >= epoch {
                return Some(self.latest_sample_since(epoch).unwrap_or(sample));
            }
        }
    }

    /// Next sample in emission order, waiting up to `timeout`.
    pub fn next_sample(&self, timeout: Duration) -> Option<ClockSample> {
        self.samples.recv_timeout(timeout).ok()
    }

    /// Wait up to `timeout` for a sample, then skip to the newest pending one.
    pub fn wait_latest(&self, timeout: Duration) -> Option<ClockSample> {
        let first = self.next_sample(timeout)?;
        Some(self.latest_sample().unwrap_or(first))
    }

    /// Stop the worker and wait for its thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.commands.send(Message::Shutdown);
            if worker.join().is_err() {
                warn!("Clock worker panicked during shutdown");
            }
        }
    }
}

impl Drop for PrecisionClock {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<T: TimeSource>(
    source: T,
    interval: Duration,
    commands: Receiver<Message>,
    samples: SyncSender<ClockSample>,
) {
    let mut state = ClockState::new();
    let mut next_tick: Option<Instant> = None;
    // Newest command sample the consumer had no room for
    let mut unsent: Option<ClockSample> = None;

    loop {
        let wake = next_tick.or_else(|| unsent.map(|_| Instant::now() + interval));
        let received = match wake {
            Some(deadline) => {
                commands.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let (sample, acknowledges) = match received {
            Ok(Message::Command(command)) => {
                let now = source.now();
                state.apply(command, now);
                debug!("Applied {:?}, clock now {:?}", command, state.phase());

                next_tick = if state.is_running() {
                    next_tick.or_else(|| Some(Instant::now() + interval))
                } else {
                    None
                };

                (state.sample(now), true)
            }
            Err(RecvTimeoutError::Timeout) if state.is_running() => {
                // Late ticks are coalesced rather than replayed.
                let now = Instant::now();
                next_tick = next_tick
                    .map(|deadline| deadline + interval)
                    .filter(|deadline| *deadline > now)
                    .or(Some(now + interval));
                (state.sample(source.now()), false)
            }
            Err(RecvTimeoutError::Timeout) => match unsent.take() {
                Some(sample) => (sample, true),
                None => continue,
            },
            Ok(Message::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
        };

        match samples.try_send(sample) {
            Ok(()) => unsent = None,
            Err(TrySendError::Full(sample)) => {
                unsent = (acknowledges && !state.is_running()).then_some(sample);
                if unsent.is_none() {
                    debug!("Sample channel full, skipping tick");
                }
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
    }

    info!("Clock worker stopped");
}
