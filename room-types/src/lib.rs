//! # room-types
//!
//! Shared types for roomsync mutators.
//!
//! This crate provides the foundational types used across all roomsync crates:
//! - [`ClientId`], [`RoomId`], [`UserId`], [`Version`] - Identity and ordering types
//! - [`AuthData`] - Validated authentication payload
//! - [`Location`], [`TransactionContext`] - Where and for whom a transaction runs
//! - [`ClientState`], [`Position`], [`UserInfo`] - Per-client presence records
//! - [`MutationRecord`], [`MutationRequest`] - Descriptions of mutations sent to a server
//! - [`MutatorError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod auth;
mod client_state;
mod context;
mod error;
mod ids;
mod messages;

pub use auth::AuthData;
pub use client_state::{ClientState, ClientStateUpdate, Position, UserInfo};
pub use context::{Location, TransactionContext};
pub use error::{MutatorError, MutatorResult};
pub use ids::{ClientId, RoomId, UserId, Version};
pub use messages::{MutationRecord, MutationRequest};
