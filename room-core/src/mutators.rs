//! The application's mutators: `setCursor`, `increment`, `initClientState`.

use async_trait::async_trait;
use room_types::{
    ClientStateUpdate, MutatorError, MutatorResult, Position, RoomId, UserInfo,
};
use serde_json::Value;

use crate::client_state::{init_client_state, update_client_state};
use crate::mutator::{decode_args, Mutator};
use crate::transaction::{get_json, put_json, WriteTransaction};

/// Key `increment` mirrors the room counter into whenever it is even.
pub const EVEN_COUNT_KEY: &str = "evenCount";

/// Key prefix for per-room counters.
pub const ROOM_COUNTER_PREFIX: &str = "room-counter/";

/// Store key of a room's counter.
pub fn room_counter_key(room_id: &RoomId) -> String {
    format!("{}{}", ROOM_COUNTER_PREFIX, room_id)
}

/// Bump the counter of the room named in the auth payload.
///
/// Server-only: on the client pass this does nothing. The counter is
/// created at zero on first use and lives in the transaction, so it rolls
/// back with it. When the new value is even it is also written under
/// [`EVEN_COUNT_KEY`].
pub async fn increment<T>(tx: &mut T) -> MutatorResult<()>
where
    T: WriteTransaction + ?Sized,
{
    if !tx.location().is_server() {
        return Ok(());
    }

    let auth = tx.auth_data()?;
    let key = room_counter_key(&auth.room_id);
    let count: u64 = get_json(&*tx, &key).await?.unwrap_or(0);
    let count = count.saturating_add(1);

    tracing::info!(
        "Incrementing counter for room {} to {} (user {})",
        auth.room_id,
        count,
        auth.user_id
    );

    put_json(&mut *tx, &key, &count).await?;
    if count % 2 == 0 {
        put_json(&mut *tx, EVEN_COUNT_KEY, &count).await?;
    }
    Ok(())
}

/// Move the calling client's cursor.
///
/// Runs identically on client and server.
pub async fn set_cursor<T>(tx: &mut T, cursor: Position) -> MutatorResult<()>
where
    T: WriteTransaction + ?Sized,
{
    let id = tx.client_id().clone();
    update_client_state(tx, ClientStateUpdate::cursor(id, cursor)).await?;
    Ok(())
}

/// `increment`: takes no arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Increment;

#[async_trait]
impl Mutator for Increment {
    fn name(&self) -> &'static str {
        "increment"
    }

    async fn apply(&self, tx: &mut dyn WriteTransaction, args: Value) -> MutatorResult<()> {
        if !args.is_null() {
            return Err(MutatorError::InvalidArgs {
                mutator: self.name().to_string(),
                reason: "takes no arguments".to_string(),
            });
        }
        increment(tx).await
    }
}

/// `setCursor`: takes `{ x, y }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetCursor;

#[async_trait]
impl Mutator for SetCursor {
    fn name(&self) -> &'static str {
        "setCursor"
    }

    async fn apply(&self, tx: &mut dyn WriteTransaction, args: Value) -> MutatorResult<()> {
        let cursor: Position = decode_args(self.name(), args)?;
        set_cursor(tx, cursor).await
    }
}

/// `initClientState`: takes a `UserInfo`, or `null` for the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitClientState;

#[async_trait]
impl Mutator for InitClientState {
    fn name(&self) -> &'static str {
        "initClientState"
    }

    async fn apply(&self, tx: &mut dyn WriteTransaction, args: Value) -> MutatorResult<()> {
        let user_info = if args.is_null() {
            UserInfo::default()
        } else {
            decode_args(self.name(), args)?
        };
        init_client_state(tx, user_info).await
    }
}
