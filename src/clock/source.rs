//! Time sources for the clock worker.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Monotonic time source read by the clock worker.
pub trait TimeSource: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// The system monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Time source that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the clock.
///
/// # Example
///
/// ```rust
/// use brew_engine::clock::{ManualTimeSource, TimeSource};
/// use std::time::Duration;
///
/// let source = ManualTimeSource::new();
/// let handle = source.clone();
/// let before = source.now();
///
/// handle.advance(Duration::from_secs(5));
/// assert_eq!(source.now() - before, Duration::from_secs(5));
/// ```
#[derive(Clone, Debug)]
pub struct ManualTimeSource {
    now: Arc<Mutex<Instant>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_source_stands_still() {
        let source = ManualTimeSource::new();
        assert_eq!(source.now(), source.now());
    }

    #[test]
    fn clones_share_the_reading() {
        let source = ManualTimeSource::new();
        let start = source.now();
        source.clone().advance(Duration::from_millis(16));
        assert_eq!(source.now() - start, Duration::from_millis(16));
    }

    #[test]
    fn system_source_is_monotonic() {
        let source = SystemTimeSource;
        let a = source.now();
        let b = source.now();
        assert!(b >= a);
    }
}
