//! Core State trait for the phases a brew session moves through.
//!
//! Both the clock (`Idle`/`Running`/`Paused`) and the brew itself
//! (`Ready`/`Brewing`/`Finished`) are described by small enums that
//! implement this trait, so they can share the same history log.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for session phases.
///
/// All methods are pure. A phase is an immutable value describing where a
/// session currently is.
///
/// # Required Traits
///
/// - `Clone`: phases are copied into the history log
/// - `PartialEq`: phases are compared to detect transitions
/// - `Debug`: phases show up in log lines
/// - `Serialize` + `Deserialize`: phases travel inside session snapshots
///
/// # Example
///
/// ```rust
/// use brew_engine::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum KettleState {
///     Cold,
///     Heating,
///     Ready,
///     Fault,
/// }
///
/// impl State for KettleState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Cold => "Cold",
///             Self::Heating => "Heating",
///             Self::Ready => "Ready",
///             Self::Fault => "Fault",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Ready | Self::Fault)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Fault)
///     }
/// }
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Name of the phase for display and logging.
    fn name(&self) -> &str;

    /// Check if this is a terminal phase.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if this is an error phase.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}
