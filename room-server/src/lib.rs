//! # roomsync-server
//!
//! Authoritative room host for roomsync.
//!
//! Every room owns one [`room_core::MemoryStore`]. A pushed
//! [`room_types::MutationRequest`] is checked against the configured
//! limits, routed to its room (opened on first use) and replayed on the
//! server pass, where `increment` actually touches the room counter.
//!
//! ```text
//! MutationRequest -> RoomServer::push -> size / rate checks
//!                                     -> Room (serialized)
//!                                     -> execute_mutation -> commit
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod limits;
pub mod room;
pub mod server;

pub use config::{Config, ConfigError, LimitsConfig, LoggingConfig, ServerConfig};
pub use error::{Result, ServerError};
pub use limits::{RateLimitError, RateLimits};
pub use room::Room;
pub use server::{MetricsSnapshot, RoomMetrics, RoomServer};
