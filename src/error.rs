//! Error types for the storyboard store and its collaborators.

use thiserror::Error;

/// Result type alias for store operations.
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors that can occur while persisting or generating.
///
/// None of these are fatal: storage failures are surfaced to the user as a
/// dismissible notice and generation failures revert the shot to its
/// no-image state. Structural problems (unknown ids, guarded deletes,
/// out-of-range indices) never raise at all; they are no-ops at the store
/// boundary, so there are no lookup-failure variants here.
#[derive(Error, Debug)]
pub enum ReelError {
    /// Serialization/deserialization error from the persistence payloads.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Durable storage rejected a write because the quota is exhausted.
    #[error("Storage quota exceeded")]
    StorageQuota,

    /// Durable storage rejected a write for any other reason.
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// An [`ImageGenerator`](crate::generate::ImageGenerator) request
    /// failed. Produced by trait implementations, not by this crate.
    #[error("Image generation failed: {0}")]
    Generation(String),
}

impl ReelError {
    /// Creates a Generation error.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }
}
