//! Error types for the room host.

use room_types::{MutatorError, RoomId};

use crate::limits::RateLimitError;

/// Main error type for room host operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The mutator failed; its transaction was rolled back.
    #[error("mutation failed: {0}")]
    Mutation(#[from] MutatorError),

    /// No room slot is free for a new room.
    #[error("room limit reached ({limit}), cannot open {room_id}")]
    RoomLimitReached {
        /// Room that could not be opened.
        room_id: RoomId,
        /// Configured maximum.
        limit: usize,
    },

    /// The auth payload names a different room than the request.
    #[error("auth is for room {authorized}, request targets {requested}")]
    RoomMismatch {
        /// Room the request was routed to.
        requested: RoomId,
        /// Room named by the auth payload.
        authorized: RoomId,
    },

    /// Rate limit exceeded.
    #[error("rate limit exceeded: {0}")]
    RateLimited(#[from] RateLimitError),

    /// Mutation arguments exceed the configured size.
    #[error("arguments too large: {size} bytes (limit: {limit} bytes)")]
    ArgsTooLarge {
        /// Encoded size of the arguments.
        size: usize,
        /// Maximum allowed size.
        limit: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for room host operations.
pub type Result<T> = std::result::Result<T, ServerError>;
