//! # room-core
//!
//! Mutators and the transactional contract they are written against.
//!
//! A mutator is a named function that changes data through a
//! [`WriteTransaction`]. The sync runtime runs every mutator twice: first
//! optimistically on the client against its local cache, then
//! authoritatively on the server against the room's datastore. Mutators
//! check [`ReadTransaction::location`] when the two passes must differ.
//!
//! ## Design Philosophy
//!
//! Mutators only ever touch state through the transaction handed to them.
//! Anything they write commits or rolls back together, so an aborted
//! transaction leaves no trace. [`MemoryStore`] is the reference
//! implementation of the contract: a versioned, snapshot-isolated map that
//! hosts and tests run mutators against.
//!
//! ```text
//! MutationRecord ─► MutatorRegistry::invoke ─► Mutator::apply
//!                                                  │
//!                              MemoryTransaction ◄─┘ get/set/del
//!                                     │ commit / rollback
//!                                     ▼
//!                                MemoryStore (Version n → n+1)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client_state;
pub mod executor;
pub mod mutator;
pub mod mutators;
pub mod registry;
pub mod store;
pub mod transaction;

pub use client_state::{
    client_state_key, get_client_state, init_client_state, list_client_states,
    must_get_client_state, put_client_state, update_client_state, CLIENT_STATE_PREFIX,
};
pub use executor::execute_mutation;
pub use mutator::{decode_args, Mutator};
pub use mutators::{
    increment, room_counter_key, set_cursor, Increment, InitClientState, SetCursor,
    EVEN_COUNT_KEY, ROOM_COUNTER_PREFIX,
};
pub use registry::{MutatorRegistry, RegistryBuilder};
pub use store::{MemoryStore, MemoryTransaction};
pub use transaction::{get_json, put_json, ReadTransaction, WriteTransaction};
