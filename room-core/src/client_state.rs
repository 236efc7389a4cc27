//! Client presence records stored through the transaction.
//!
//! One record per client under `client-state/<clientID>`.

use room_types::{ClientId, ClientState, ClientStateUpdate, MutatorError, MutatorResult, UserInfo};

use crate::transaction::{get_json, put_json, ReadTransaction, WriteTransaction};

/// Key prefix for client state records.
pub const CLIENT_STATE_PREFIX: &str = "client-state/";

/// Store key of a client's record.
pub fn client_state_key(id: &ClientId) -> String {
    format!("{}{}", CLIENT_STATE_PREFIX, id)
}

/// Read a client's record, if it exists.
pub async fn get_client_state<T>(tx: &T, id: &ClientId) -> MutatorResult<Option<ClientState>>
where
    T: ReadTransaction + ?Sized,
{
    get_json(tx, &client_state_key(id)).await
}

/// Read a client's record, failing if it does not exist.
pub async fn must_get_client_state<T>(tx: &T, id: &ClientId) -> MutatorResult<ClientState>
where
    T: ReadTransaction + ?Sized,
{
    get_client_state(tx, id)
        .await?
        .ok_or_else(|| MutatorError::MissingClientState(id.to_string()))
}

/// Write a client's record.
pub async fn put_client_state<T>(tx: &mut T, state: &ClientState) -> MutatorResult<()>
where
    T: WriteTransaction + ?Sized,
{
    put_json(tx, &client_state_key(&state.id), state).await
}

/// Create the record for `tx.client_id()` unless one already exists.
pub async fn init_client_state<T>(tx: &mut T, user_info: UserInfo) -> MutatorResult<()>
where
    T: WriteTransaction + ?Sized,
{
    let id = tx.client_id().clone();
    if tx.has(&client_state_key(&id)).await? {
        return Ok(());
    }

    tracing::debug!("Initializing client state for {} ({})", id, user_info.name);
    put_client_state(tx, &ClientState::new(id, user_info)).await
}

/// Merge a partial update into a client's record.
///
/// A client without a record gets a fresh one with default user info, so
/// presence updates never depend on lifecycle hooks having run first.
pub async fn update_client_state<T>(
    tx: &mut T,
    update: ClientStateUpdate,
) -> MutatorResult<ClientState>
where
    T: WriteTransaction + ?Sized,
{
    let previous = match get_client_state(&*tx, &update.id).await? {
        Some(state) => state,
        None => ClientState::new(update.id.clone(), UserInfo::default()),
    };

    let next = previous.apply(update);
    put_client_state(tx, &next).await?;
    Ok(next)
}

/// Every client record visible to the transaction, ordered by client id.
pub async fn list_client_states<T>(tx: &T) -> MutatorResult<Vec<ClientState>>
where
    T: ReadTransaction + ?Sized,
{
    tx.scan(CLIENT_STATE_PREFIX)
        .await?
        .into_iter()
        .map(|(_, value)| serde_json::from_value(value).map_err(MutatorError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use room_types::{Position, TransactionContext};

    fn client_ctx(id: &str) -> TransactionContext {
        TransactionContext::client(ClientId::new(id), None)
    }

    #[test]
    fn key_includes_client_id() {
        assert_eq!(client_state_key(&ClientId::new("c1")), "client-state/c1");
    }

    #[tokio::test]
    async fn init_creates_record_at_origin() {
        let store = MemoryStore::new();
        let mut tx = store.begin(client_ctx("c1")).await;

        let info = UserInfo {
            name: "Ada".into(),
            ..UserInfo::default()
        };
        init_client_state(&mut tx, info.clone()).await.unwrap();

        let state = must_get_client_state(&tx, &ClientId::new("c1")).await.unwrap();
        assert_eq!(state.cursor, Position::default());
        assert_eq!(state.user_info, info);
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let store = MemoryStore::new();
        let mut tx = store.begin(client_ctx("c1")).await;

        init_client_state(&mut tx, UserInfo::default()).await.unwrap();
        update_client_state(
            &mut tx,
            ClientStateUpdate::cursor(ClientId::new("c1"), Position::new(5.0, 5.0)),
        )
        .await
        .unwrap();
        init_client_state(&mut tx, UserInfo::default()).await.unwrap();

        let state = must_get_client_state(&tx, &ClientId::new("c1")).await.unwrap();
        assert_eq!(state.cursor, Position::new(5.0, 5.0));
    }

    #[tokio::test]
    async fn must_get_fails_for_unknown_client() {
        let store = MemoryStore::new();
        let tx = store.begin(client_ctx("c1")).await;

        let err = must_get_client_state(&tx, &ClientId::new("nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, MutatorError::MissingClientState(id) if id == "nobody"));
    }

    #[tokio::test]
    async fn update_without_record_creates_one() {
        let store = MemoryStore::new();
        let mut tx = store.begin(client_ctx("c1")).await;

        let state = update_client_state(
            &mut tx,
            ClientStateUpdate::cursor(ClientId::new("c1"), Position::new(1.0, 2.0)),
        )
        .await
        .unwrap();

        assert_eq!(state.id.as_str(), "c1");
        assert_eq!(state.user_info, UserInfo::default());
    }

    #[tokio::test]
    async fn list_returns_all_clients() {
        let store = MemoryStore::new();
        for id in ["b", "a"] {
            let mut tx = store.begin(client_ctx(id)).await;
            init_client_state(&mut tx, UserInfo::default()).await.unwrap();
            tx.commit().await.unwrap();
        }

        let tx = store.begin(client_ctx("a")).await;
        let states = list_client_states(&tx).await.unwrap();
        let ids: Vec<_> = states.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
