//! Versioned in-memory store with snapshot-isolated transactions.
//!
//! [`MemoryStore::begin`] takes an O(1) snapshot of the committed map
//! (an `Arc` clone). Writes are buffered in the [`MemoryTransaction`] and
//! only reach the store on [`MemoryTransaction::commit`], which applies
//! them atomically and bumps the store [`Version`]. Dropping or rolling
//! back a transaction discards its writes.
//!
//! Commits are optimistic: if another transaction committed after the
//! snapshot was taken, the commit fails with
//! [`MutatorError::StaleTransaction`] and nothing is applied.

use async_trait::async_trait;
use room_types::{ClientId, Location, MutatorError, MutatorResult, TransactionContext, Version};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transaction::{ReadTransaction, WriteTransaction};

type Entries = BTreeMap<String, Value>;

/// A shareable, versioned key/value store.
///
/// Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    data: Arc<Entries>,
    version: Version,
}

impl MemoryStore {
    /// Create an empty store at version zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction against the current committed state.
    pub async fn begin(&self, ctx: TransactionContext) -> MemoryTransaction {
        let inner = self.inner.read().await;
        MemoryTransaction {
            store: self.clone(),
            ctx,
            snapshot: Arc::clone(&inner.data),
            base: inner.version,
            writes: BTreeMap::new(),
        }
    }

    /// Current committed version.
    pub async fn version(&self) -> Version {
        self.inner.read().await.version
    }

    /// Read a committed key outside any transaction.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().await.data.get(key).cloned()
    }

    /// Copy of every committed entry.
    pub async fn entries(&self) -> BTreeMap<String, Value> {
        self.inner.read().await.data.as_ref().clone()
    }

    /// Number of committed keys.
    pub async fn len(&self) -> usize {
        self.inner.read().await.data.len()
    }

    /// Check if nothing has been committed.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.data.is_empty()
    }
}

/// A transaction over a [`MemoryStore`].
///
/// `None` entries in the write buffer are pending deletes.
#[derive(Debug)]
pub struct MemoryTransaction {
    store: MemoryStore,
    ctx: TransactionContext,
    snapshot: Arc<Entries>,
    base: Version,
    writes: BTreeMap<String, Option<Value>>,
}

impl MemoryTransaction {
    /// Version of the snapshot this transaction reads from.
    pub fn base_version(&self) -> Version {
        self.base
    }

    /// Check if the transaction has buffered writes.
    pub fn is_dirty(&self) -> bool {
        !self.writes.is_empty()
    }

    /// Keys written or deleted so far, in key order.
    pub fn written_keys(&self) -> Vec<&str> {
        self.writes.keys().map(String::as_str).collect()
    }

    /// Apply buffered writes to the store.
    ///
    /// Returns the store version after the commit. A transaction with no
    /// writes commits trivially and leaves the version unchanged.
    pub async fn commit(self) -> MutatorResult<Version> {
        let Self {
            store, ctx, base, writes, ..
        } = self;

        let mut inner = store.inner.write().await;

        if writes.is_empty() {
            return Ok(inner.version);
        }

        if inner.version != base {
            tracing::debug!(
                "Rejected stale commit from client {} (snapshot {}, store {})",
                ctx.client_id,
                base,
                inner.version
            );
            return Err(MutatorError::StaleTransaction {
                snapshot: base,
                current: inner.version,
            });
        }

        let write_count = writes.len();
        let data = Arc::make_mut(&mut inner.data);
        for (key, value) in writes {
            match value {
                Some(value) => {
                    data.insert(key, value);
                }
                None => {
                    data.remove(&key);
                }
            }
        }
        inner.version = inner.version.next();

        tracing::debug!(
            "Committed {} writes from client {} ({} pass) at version {}",
            write_count,
            ctx.client_id,
            ctx.location,
            inner.version
        );

        Ok(inner.version)
    }

    /// Discard buffered writes.
    pub fn rollback(self) {
        if self.is_dirty() {
            tracing::debug!(
                "Rolled back {} writes from client {}",
                self.writes.len(),
                self.ctx.client_id
            );
        }
    }
}

#[async_trait]
impl ReadTransaction for MemoryTransaction {
    fn location(&self) -> Location {
        self.ctx.location
    }

    fn client_id(&self) -> &ClientId {
        &self.ctx.client_id
    }

    fn auth(&self) -> Option<&Value> {
        self.ctx.auth.as_ref()
    }

    async fn get(&self, key: &str) -> MutatorResult<Option<Value>> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => Ok(self.snapshot.get(key).cloned()),
        }
    }

    async fn scan(&self, prefix: &str) -> MutatorResult<Vec<(String, Value)>> {
        let mut merged: Entries = self
            .snapshot
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        for (key, pending) in self
            .writes
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            match pending {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_iter().collect())
    }
}

#[async_trait]
impl WriteTransaction for MemoryTransaction {
    async fn set(&mut self, key: &str, value: Value) -> MutatorResult<()> {
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    async fn del(&mut self, key: &str) -> MutatorResult<bool> {
        let existed = self.has(key).await?;
        self.writes.insert(key.to_string(), None);
        Ok(existed)
    }
}
