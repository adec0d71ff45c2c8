//! Snapshot error types.

use crate::core::RecipeSignature;
use thiserror::Error;

/// Errors that can occur while saving or restoring a session snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot data failed validation
    #[error("Snapshot validation failed: {0}")]
    ValidationFailed(String),

    /// Snapshot was taken for a different recipe than the one loaded
    #[error("Snapshot belongs to recipe {found:?}, session has {expected:?}")]
    RecipeMismatch {
        expected: RecipeSignature,
        found: RecipeSignature,
    },
}
