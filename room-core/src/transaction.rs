//! Transaction traits mutators are written against.
//!
//! A transaction is a scoped, isolated read/write view of a versioned
//! key/value store. Every read within one transaction observes the same
//! snapshot plus the transaction's own writes.
//!
//! Both traits are object-safe; mutators receive `&mut dyn WriteTransaction`
//! so the same code runs against a client cache or a room datastore.

use async_trait::async_trait;
use room_types::{AuthData, ClientId, Location, MutatorError, MutatorResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Read side of a transaction.
#[async_trait]
pub trait ReadTransaction: Send + Sync {
    /// Where this transaction is executing.
    fn location(&self) -> Location;

    /// Client that issued the mutation.
    fn client_id(&self) -> &ClientId;

    /// Raw auth payload, unvalidated.
    fn auth(&self) -> Option<&Value>;

    /// Validated auth payload.
    ///
    /// Fails with [`MutatorError::MissingAuth`] or
    /// [`MutatorError::InvalidAuth`] rather than guessing.
    fn auth_data(&self) -> MutatorResult<AuthData> {
        AuthData::from_value(self.auth())
    }

    /// Read a key.
    async fn get(&self, key: &str) -> MutatorResult<Option<Value>>;

    /// Check whether a key exists.
    async fn has(&self, key: &str) -> MutatorResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// All entries whose key starts with `prefix`, ordered by key.
    async fn scan(&self, prefix: &str) -> MutatorResult<Vec<(String, Value)>>;
}

/// Write side of a transaction.
#[async_trait]
pub trait WriteTransaction: ReadTransaction {
    /// Write a key.
    async fn set(&mut self, key: &str, value: Value) -> MutatorResult<()>;

    /// Delete a key. Returns whether it existed.
    async fn del(&mut self, key: &str) -> MutatorResult<bool>;
}

/// Read a key and decode it into `V`.
pub async fn get_json<T, V>(tx: &T, key: &str) -> MutatorResult<Option<V>>
where
    T: ReadTransaction + ?Sized,
    V: DeserializeOwned,
{
    match tx.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Encode `value` and write it under `key`.
pub async fn put_json<T, V>(tx: &mut T, key: &str, value: &V) -> MutatorResult<()>
where
    T: WriteTransaction + ?Sized,
    V: Serialize + ?Sized,
{
    let value = serde_json::to_value(value).map_err(MutatorError::Json)?;
    tx.set(key, value).await
}
