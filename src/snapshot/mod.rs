//! Session snapshots.
//!
//! A snapshot captures enough of a brew session to resume it elsewhere:
//! which recipe it was for, the clock reading, whether it was running and
//! the brew log so far. Restoring re-bases the clock with `sync`.

use crate::core::{BrewStatus, RecipeSignature, StateHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable state of a brew session.
///
/// # Example
///
/// ```rust
/// use brew_engine::core::{Recipe, StateHistory};
/// use brew_engine::snapshot::SessionSnapshot;
///
/// let snapshot = SessionSnapshot::new(
///     Recipe::default().signature(),
///     52_000.0,
///     true,
///     false,
///     StateHistory::new(),
/// );
///
/// let json = snapshot.to_json().unwrap();
/// let restored = SessionSnapshot::from_json(&json).unwrap();
/// assert_eq!(restored.elapsed_ms, 52_000.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Recipe the session was brewing
    pub recipe: RecipeSignature,

    /// Clock reading at snapshot time
    pub elapsed_ms: f64,

    /// Whether the clock was running
    pub running: bool,

    /// Whether the brew had already finished
    pub finished: bool,

    /// Brew log up to the snapshot
    pub history: StateHistory<BrewStatus>,
}

impl SessionSnapshot {
    pub fn new(
        recipe: RecipeSignature,
        elapsed_ms: f64,
        running: bool,
        finished: bool,
        history: StateHistory<BrewStatus>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            recipe,
            elapsed_ms,
            running,
            finished,
            history,
        }
    }

    /// Check that this snapshot can be restored by this version.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if !self.elapsed_ms.is_finite() || self.elapsed_ms < 0.0 {
            return Err(SnapshotError::ValidationFailed(format!(
                "elapsed_ms must be a non-negative number, got {}",
                self.elapsed_ms
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
