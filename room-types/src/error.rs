//! Error types for roomsync mutators.

use thiserror::Error;

use crate::Version;

/// Errors that can occur while running a mutator or handling its records.
#[derive(Debug, Error)]
pub enum MutatorError {
    /// The transaction carries no authentication payload
    #[error("missing auth payload")]
    MissingAuth,

    /// The authentication payload is present but malformed
    #[error("invalid auth field `{field}`: {reason}")]
    InvalidAuth {
        /// Name of the offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Mutator arguments could not be decoded
    #[error("invalid arguments for `{mutator}`: {reason}")]
    InvalidArgs {
        /// Mutator that rejected the arguments.
        mutator: String,
        /// Decoder message.
        reason: String,
    },

    /// No mutator is registered under this name
    #[error("unknown mutator: {0}")]
    UnknownMutator(String),

    /// Two mutators were registered under the same name
    #[error("duplicate mutator: {0}")]
    DuplicateMutator(String),

    /// A client state record was required but not found
    #[error("client state not found: {0}")]
    MissingClientState(String),

    /// The store moved on since the transaction took its snapshot
    #[error("stale transaction: snapshot at version {snapshot}, store at {current}")]
    StaleTransaction {
        /// Version the transaction read from.
        snapshot: Version,
        /// Version the store is at now.
        current: Version,
    },

    /// A stored value did not have the expected shape
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] rmp_serde::encode::Error),

    /// MessagePack deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] rmp_serde::decode::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for mutator operations.
pub type MutatorResult<T> = std::result::Result<T, MutatorError>;
