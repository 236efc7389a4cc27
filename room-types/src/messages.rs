//! Mutation descriptions exchanged between client and server.
//!
//! A client runs a mutator optimistically and then sends only its name and
//! arguments; the server re-runs the same mutator against the room's
//! authoritative store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ClientId, MutatorError, RoomId};

/// Name and arguments of one mutator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Registered mutator name, e.g. `setCursor`.
    pub name: String,
    /// JSON arguments (`null` for mutators that take none).
    #[serde(default)]
    pub args: Value,
}

impl MutationRecord {
    /// Create a record with arguments.
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Create a record for a mutator that takes no arguments.
    pub fn without_args(name: impl Into<String>) -> Self {
        Self::new(name, Value::Null)
    }

    /// Serialize to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MutatorError> {
        rmp_serde::to_vec(self).map_err(MutatorError::Serialization)
    }

    /// Deserialize from MessagePack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MutatorError> {
        rmp_serde::from_slice(bytes).map_err(MutatorError::Deserialization)
    }

    /// Size of the JSON-encoded arguments in bytes.
    pub fn args_len(&self) -> usize {
        serde_json::to_vec(&self.args).map(|v| v.len()).unwrap_or(0)
    }
}

/// A mutation addressed to a room on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    /// Target room.
    pub room_id: RoomId,
    /// Client that issued the mutation.
    pub client_id: ClientId,
    /// Raw auth payload for the client's connection.
    pub auth: Option<Value>,
    /// What to run.
    pub mutation: MutationRecord,
}
