//! Run one mutation through both passes.

use anyhow::{Context, Result};
use room_core::{execute_mutation, MemoryStore, MutatorRegistry};
use room_server::{Config, RoomServer};
use room_types::{
    AuthData, ClientId, MutationRecord, MutationRequest, RoomId, TransactionContext, UserId,
};
use serde_json::Value;

use crate::output::print_entries;

/// Options for the mutate command.
#[derive(Debug)]
pub struct MutateOptions {
    /// Mutator name.
    pub name: String,
    /// Room id.
    pub room: String,
    /// User id.
    pub user: String,
    /// Client id, random if absent.
    pub client: Option<String>,
    /// JSON arguments.
    pub args: Option<String>,
    /// Repetitions.
    pub times: u32,
}

/// Run the mutate command.
pub async fn run(config: Config, opts: MutateOptions) -> Result<()> {
    let args: Value = match &opts.args {
        Some(raw) => serde_json::from_str(raw).context("--args is not valid JSON")?,
        None => Value::Null,
    };
    let record = MutationRecord::new(&opts.name, args);

    let room_id = RoomId::new(&opts.room);
    let client_id = opts.client.map(ClientId::new).unwrap_or_else(ClientId::random);
    let auth = AuthData::new(UserId::new(&opts.user), room_id.clone()).to_value();

    let registry = MutatorRegistry::standard();

    // Optimistic pass against a local cache.
    let local = MemoryStore::new();
    for _ in 0..opts.times {
        execute_mutation(
            &registry,
            &local,
            TransactionContext::client(client_id.clone(), Some(auth.clone())),
            &record,
        )
        .await
        .with_context(|| format!("Client pass of {} failed", opts.name))?;
    }

    // Authoritative replay, sent in wire form.
    let wire = record.to_bytes().context("Failed to encode mutation")?;
    tracing::debug!("Encoded {} as {} bytes", record.name, wire.len());

    let server = RoomServer::new(config, registry);
    let mut version = None;
    for _ in 0..opts.times {
        let mutation = MutationRecord::from_bytes(&wire).context("Failed to decode mutation")?;
        let request = MutationRequest {
            room_id: room_id.clone(),
            client_id: client_id.clone(),
            auth: Some(auth.clone()),
            mutation,
        };
        version = Some(
            server
                .push(request)
                .await
                .with_context(|| format!("Server pass of {} failed", opts.name))?,
        );
    }

    print_entries(
        &format!("client pass (room {}, client {})", room_id, client_id),
        &local.entries().await,
    );
    println!();

    let entries = server.snapshot(&room_id).await.unwrap_or_default();
    match version {
        Some(v) => print_entries(&format!("server pass (room {}, version {})", room_id, v), &entries),
        None => print_entries(&format!("server pass (room {})", room_id), &entries),
    }

    Ok(())
}
