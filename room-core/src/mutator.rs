//! The mutator trait.

use async_trait::async_trait;
use room_types::{MutatorError, MutatorResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::transaction::WriteTransaction;

/// A named data change, runnable on both client and server.
///
/// Implementations must touch state only through `tx`: whatever they write
/// commits or rolls back with the transaction.
#[async_trait]
pub trait Mutator: Send + Sync {
    /// Name the mutator is registered and invoked under.
    fn name(&self) -> &'static str;

    /// Run the mutator with JSON arguments.
    async fn apply(&self, tx: &mut dyn WriteTransaction, args: Value) -> MutatorResult<()>;
}

/// Decode mutator arguments, tagging failures with the mutator name.
pub fn decode_args<T: DeserializeOwned>(mutator: &str, args: Value) -> MutatorResult<T> {
    serde_json::from_value(args).map_err(|e| MutatorError::InvalidArgs {
        mutator: mutator.to_string(),
        reason: e.to_string(),
    })
}
