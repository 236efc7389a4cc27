//! Run one mutation as one transaction.

use room_types::{MutationRecord, MutatorResult, TransactionContext, Version};

use crate::registry::MutatorRegistry;
use crate::store::MemoryStore;

/// Execute `record` against `store` in a fresh transaction.
///
/// Commits when the mutator succeeds and returns the resulting store
/// version. On any error the transaction is rolled back and the store is
/// left exactly as it was.
pub async fn execute_mutation(
    registry: &MutatorRegistry,
    store: &MemoryStore,
    ctx: TransactionContext,
    record: &MutationRecord,
) -> MutatorResult<Version> {
    let mut tx = store.begin(ctx).await;

    match registry.invoke(&record.name, &mut tx, record.args.clone()).await {
        Ok(()) => tx.commit().await,
        Err(e) => {
            tracing::debug!("Mutator {} failed: {}", record.name, e);
            tx.rollback();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutator::Mutator;
    use crate::mutators::{room_counter_key, EVEN_COUNT_KEY};
    use crate::transaction::WriteTransaction;
    use async_trait::async_trait;
    use room_types::{ClientId, MutatorError, RoomId};
    use serde_json::{json, Value};

    /// Writes a key and then fails.
    struct HalfDone;

    #[async_trait]
    impl Mutator for HalfDone {
        fn name(&self) -> &'static str {
            "halfDone"
        }

        async fn apply(&self, tx: &mut dyn WriteTransaction, _args: Value) -> MutatorResult<()> {
            tx.set("partial", json!(true)).await?;
            Err(MutatorError::Internal("gave up".into()))
        }
    }

    fn server_ctx(room: &str) -> TransactionContext {
        TransactionContext::server(
            ClientId::new("c1"),
            Some(json!({ "userID": "u1", "roomID": room })),
        )
    }

    #[tokio::test]
    async fn successful_mutation_commits() {
        let registry = MutatorRegistry::standard();
        let store = MemoryStore::new();

        let version = execute_mutation(
            &registry,
            &store,
            server_ctx("A"),
            &MutationRecord::without_args("increment"),
        )
        .await
        .unwrap();

        assert_eq!(version, Version::new(1));
        assert_eq!(
            store.get(&room_counter_key(&RoomId::new("A"))).await,
            Some(json!(1))
        );
    }

    #[tokio::test]
    async fn failed_mutation_rolls_back() {
        let registry = MutatorRegistry::builder()
            .with_standard()
            .register(HalfDone)
            .build()
            .unwrap();
        let store = MemoryStore::new();

        let result = execute_mutation(
            &registry,
            &store,
            server_ctx("A"),
            &MutationRecord::without_args("halfDone"),
        )
        .await;

        assert!(matches!(result, Err(MutatorError::Internal(_))));
        assert!(store.is_empty().await);
        assert_eq!(store.version().await, Version::zero());
    }

    #[tokio::test]
    async fn client_pass_leaves_counters_alone() {
        let registry = MutatorRegistry::standard();
        let store = MemoryStore::new();
        let ctx = TransactionContext::client(
            ClientId::new("c1"),
            Some(json!({ "userID": "u1", "roomID": "A" })),
        );

        for _ in 0..4 {
            execute_mutation(
                &registry,
                &store,
                ctx.clone(),
                &MutationRecord::without_args("increment"),
            )
            .await
            .unwrap();
        }

        assert!(store.is_empty().await);
        assert_eq!(store.get(EVEN_COUNT_KEY).await, None);
    }

    #[tokio::test]
    async fn invalid_args_are_rejected_without_writes() {
        let registry = MutatorRegistry::standard();
        let store = MemoryStore::new();

        let result = execute_mutation(
            &registry,
            &store,
            server_ctx("A"),
            &MutationRecord::new("setCursor", json!({ "x": "far" })),
        )
        .await;

        assert!(matches!(result, Err(MutatorError::InvalidArgs { .. })));
        assert!(store.is_empty().await);
    }
}
