//! Error taxonomy for casebook.
//!
//! One canonical error type is shared by every layer. The stores themselves
//! report absence as a value (`Option`), never as an error; the coordinator
//! turns absence into [`Error::NotFound`] / [`Error::SuiteNotFound`] at the
//! operation boundary.

use crate::types::{EntityId, EntityKind};
use thiserror::Error;

/// All casebook errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The addressed record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind the id was resolved against.
        kind: EntityKind,
        /// The missing id.
        id: EntityId,
    },

    /// A case operation referenced a suite that does not exist.
    #[error("test suite not found: {0}")]
    SuiteNotFound(EntityId),

    /// A freshly allocated id collided with an existing record.
    ///
    /// With sequence-based allocation this only happens if the hash was
    /// written to outside the store.
    #[error("{kind} already exists: {id}")]
    AlreadyExists {
        /// Entity kind of the colliding record.
        kind: EntityKind,
        /// The colliding id.
        id: EntityId,
    },

    /// Suite deletion refused because cases are still linked.
    ///
    /// This is a business-rule rejection, not a failure: the suite and all
    /// of its cases are guaranteed untouched.
    #[error("test suite {0} has linked test cases; pass force to cascade-delete them")]
    ConflictHasLinkedCases(EntityId),

    /// A required field was missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored value could not be encoded or decoded.
    #[error("record codec error: {0}")]
    Codec(String),

    /// The backend failed or timed out; the current sequence is aborted at
    /// the step it reached. Already-applied sub-steps are not rolled back,
    /// and the whole sequence is safe to retry.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Result type for casebook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for both flavors of record absence.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::SuiteNotFound(_))
    }

    /// True for deliberate business-rule rejections.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::ConflictHasLinkedCases(_) | Error::AlreadyExists { .. }
        )
    }

    /// True when retrying the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::BackendUnavailable(_))
    }
}
