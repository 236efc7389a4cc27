//! Replay a script of mutations.
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "room": "A", "client": "c1", "user": "alice", "name": "increment" },
//!   { "room": "A", "client": "c1", "user": "alice", "name": "setCursor", "args": { "x": 1, "y": 2 } }
//! ]
//! ```
//!
//! Failing steps are reported and skipped; the rest still run.

use anyhow::{Context, Result};
use room_core::MutatorRegistry;
use room_server::{Config, RoomServer};
use room_types::{AuthData, ClientId, MutationRecord, MutationRequest, RoomId, UserId};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::output::print_entries;

/// One scripted mutation.
#[derive(Debug, Deserialize)]
pub struct Step {
    /// Room id.
    pub room: String,
    /// Client id.
    pub client: String,
    /// User id.
    pub user: String,
    /// Mutator name.
    pub name: String,
    /// Mutator arguments.
    #[serde(default)]
    pub args: Value,
}

impl Step {
    fn into_request(self) -> MutationRequest {
        let room_id = RoomId::new(self.room);
        let auth = AuthData::new(UserId::new(self.user), room_id.clone()).to_value();
        MutationRequest {
            room_id,
            client_id: ClientId::new(self.client),
            auth: Some(auth),
            mutation: MutationRecord::new(self.name, self.args),
        }
    }
}

/// Run the script command.
pub async fn run(config: Config, file: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read script {}", file.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&raw).context("Failed to parse script")?;

    let server = RoomServer::new(config, MutatorRegistry::standard());
    let total = steps.len();
    let mut failed = 0;

    for (i, step) in steps.into_iter().enumerate() {
        let name = step.name.clone();
        if let Err(e) = server.push(step.into_request()).await {
            failed += 1;
            println!("step {} ({}) failed: {}", i + 1, name, e);
        }
    }

    println!("=== {} steps, {} failed ===", total, failed);
    for room_id in server.room_ids() {
        let entries = server.snapshot(&room_id).await.unwrap_or_default();
        println!();
        print_entries(&format!("room {}", room_id), &entries);
    }

    let metrics = server.metrics().snapshot();
    tracing::info!(
        "Script done: {} committed, {} failed, {} rooms",
        metrics.mutations_total,
        metrics.mutations_failed,
        metrics.rooms_created
    );

    Ok(())
}
