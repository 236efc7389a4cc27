//! A single room: one authoritative store, one mutation at a time.

use room_core::{execute_mutation, MemoryStore, MutatorRegistry};
use room_types::{ClientId, MutationRecord, MutatorResult, RoomId, TransactionContext, Version};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// An authoritative room datastore.
///
/// Mutations against the same room are serialized by an async mutex, so
/// every server transaction sees the result of the one before it and
/// never commits stale.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    store: MemoryStore,
    serial: Mutex<()>,
}

impl Room {
    /// Create an empty room.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            store: MemoryStore::new(),
            serial: Mutex::new(()),
        }
    }

    /// The room's identifier.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// The room's store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Run a mutation on the authoritative (server) pass.
    pub async fn apply(
        &self,
        registry: &MutatorRegistry,
        client_id: ClientId,
        auth: Option<Value>,
        record: &MutationRecord,
    ) -> MutatorResult<Version> {
        let _turn = self.serial.lock().await;
        execute_mutation(
            registry,
            &self.store,
            TransactionContext::server(client_id, auth),
            record,
        )
        .await
    }

    /// Current committed version.
    pub async fn version(&self) -> Version {
        self.store.version().await
    }

    /// Copy of every committed entry.
    pub async fn entries(&self) -> BTreeMap<String, Value> {
        self.store.entries().await
    }
}
