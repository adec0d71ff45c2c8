//! Clock error types.

use thiserror::Error;

/// Errors that can occur while setting up a precision clock.
///
/// Running clocks never fail: bad commands are ignored.
#[derive(Debug, Error)]
pub enum ClockError {
    /// The worker thread could not be spawned
    #[error("Failed to spawn clock worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// Clock configuration was rejected
    #[error("Invalid clock configuration: {0}")]
    InvalidConfig(String),

    /// Clock configuration document could not be parsed
    #[error("Failed to parse clock configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
