//! Execution context handed to every transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::ClientId;

/// Where a mutation is being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Optimistic pass against the client's local cache.
    Client,
    /// Authoritative pass against the room's datastore.
    Server,
}

impl Location {
    /// Check if this is the authoritative server pass.
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => f.write_str("client"),
            Self::Server => f.write_str("server"),
        }
    }
}

/// Who a transaction runs for and where.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionContext {
    /// Execution location.
    pub location: Location,
    /// Client that issued the mutation.
    pub client_id: ClientId,
    /// Raw auth payload, if the connection carried one.
    pub auth: Option<Value>,
}

impl TransactionContext {
    /// Context for the optimistic client pass.
    pub fn client(client_id: ClientId, auth: Option<Value>) -> Self {
        Self {
            location: Location::Client,
            client_id,
            auth,
        }
    }

    /// Context for the authoritative server pass.
    pub fn server(client_id: ClientId, auth: Option<Value>) -> Self {
        Self {
            location: Location::Server,
            client_id,
            auth,
        }
    }
}
