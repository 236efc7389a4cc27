//! Main RoomServer coordination.
//!
//! RoomServer owns the room table, applies incoming mutations on the
//! authoritative pass and keeps operational counters.

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::limits::RateLimits;
use crate::room::Room;
use dashmap::DashMap;
use room_core::MutatorRegistry;
use room_types::{AuthData, MutationRequest, RoomId, Version};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Operational metrics for monitoring room activity.
///
/// All counters are monotonically increasing (reset only on restart).
#[derive(Debug, Default)]
pub struct RoomMetrics {
    /// Mutations committed.
    pub mutations_total: AtomicU64,
    /// Mutations whose mutator failed and were rolled back.
    pub mutations_failed: AtomicU64,
    /// Rooms opened since start.
    pub rooms_created: AtomicU64,
    /// Mutations rejected by the per-client rate limit.
    pub rate_limit_hits: AtomicU64,
    /// Requests rejected before reaching a mutator (size, auth room, room limit).
    pub rejected_total: AtomicU64,
}

impl RoomMetrics {
    /// Read every counter at once.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            mutations_total: self.mutations_total.load(Ordering::Relaxed),
            mutations_failed: self.mutations_failed.load(Ordering::Relaxed),
            rooms_created: self.rooms_created.load(Ordering::Relaxed),
            rate_limit_hits: self.rate_limit_hits.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RoomMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Mutations committed.
    pub mutations_total: u64,
    /// Mutations rolled back.
    pub mutations_failed: u64,
    /// Rooms opened.
    pub rooms_created: u64,
    /// Rate limit rejections.
    pub rate_limit_hits: u64,
    /// Other rejections.
    pub rejected_total: u64,
}

/// Authoritative host for every room.
pub struct RoomServer {
    config: Config,
    registry: MutatorRegistry,
    /// Per-client mutation limiter.
    rate_limits: RateLimits,
    metrics: RoomMetrics,
    /// Open rooms, created on first mutation.
    rooms: DashMap<RoomId, Arc<Room>>,
    /// Room slots taken, reserved before a room is inserted.
    open_slots: AtomicUsize,
    /// Pushes that passed the rate limit, for limiter sweeps.
    accepted_pushes: AtomicU64,
}

impl std::fmt::Debug for RoomServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomServer")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("rate_limits", &self.rate_limits)
            .field("metrics", &self.metrics)
            .field("rooms_count", &self.rooms.len())
            .finish()
    }
}

impl RoomServer {
    /// Create a RoomServer with the given config and mutators.
    pub fn new(config: Config, registry: MutatorRegistry) -> Self {
        let rate_limits = RateLimits::new(&config.limits);
        Self {
            config,
            registry,
            rate_limits,
            metrics: RoomMetrics::default(),
            rooms: DashMap::new(),
            open_slots: AtomicUsize::new(0),
            accepted_pushes: AtomicU64::new(0),
        }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the mutator registry.
    pub fn registry(&self) -> &MutatorRegistry {
        &self.registry
    }

    /// Get access to the rate limiters.
    pub fn rate_limits(&self) -> &RateLimits {
        &self.rate_limits
    }

    /// Get access to the operational metrics.
    pub fn metrics(&self) -> &RoomMetrics {
        &self.metrics
    }

    /// Look up an open room.
    pub fn room(&self, room_id: &RoomId) -> Option<Arc<Room>> {
        self.rooms.get(room_id).map(|r| Arc::clone(r.value()))
    }

    /// Number of open rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Ids of all open rooms, sorted.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Committed entries of a room, or `None` if it was never opened.
    pub async fn snapshot(&self, room_id: &RoomId) -> Option<BTreeMap<String, Value>> {
        let room = self.room(room_id)?;
        Some(room.entries().await)
    }

    /// Apply a pushed mutation on the authoritative pass.
    ///
    /// Returns the room's store version after the commit. Rejections
    /// (size, rate, auth room, room limit) happen before any transaction is
    /// opened; mutator failures roll the transaction back.
    pub async fn push(&self, request: MutationRequest) -> Result<Version> {
        let MutationRequest {
            room_id,
            client_id,
            auth,
            mutation,
        } = request;

        let size = mutation.args_len();
        let limit = self.config.limits.max_args_bytes;
        if size > limit {
            self.metrics.rejected_total.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "Rejected {} from {}: args {} bytes over limit {}",
                mutation.name,
                client_id,
                size,
                limit
            );
            return Err(ServerError::ArgsTooLarge { size, limit });
        }

        if let Err(e) = self.rate_limits.check_mutation(&client_id) {
            self.metrics.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Rate limited client {}", client_id);
            return Err(e.into());
        }
        self.sweep_limiter();

        if let Err(e) = check_auth_room(&room_id, auth.as_ref()) {
            self.metrics.rejected_total.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Rejected {} from {}: {}", mutation.name, client_id, e);
            return Err(e);
        }

        let room = self.open_room(&room_id)?;

        match room
            .apply(&self.registry, client_id.clone(), auth, &mutation)
            .await
        {
            Ok(version) => {
                self.metrics.mutations_total.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    "Applied {} from {} in room {} at {}",
                    mutation.name,
                    client_id,
                    room_id,
                    version
                );
                Ok(version)
            }
            Err(e) => {
                self.metrics.mutations_failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "Mutation {} from {} in room {} failed: {}",
                    mutation.name,
                    client_id,
                    room_id,
                    e
                );
                Err(e.into())
            }
        }
    }

    /// Drop recharged limiter entries every `limits.limiter_sweep_every` pushes.
    fn sweep_limiter(&self) {
        let every = self.config.limits.limiter_sweep_every;
        if every == 0 {
            return;
        }
        let accepted = self.accepted_pushes.fetch_add(1, Ordering::Relaxed) + 1;
        if accepted % every == 0 {
            self.rate_limits.shrink();
            tracing::debug!(
                "Swept rate limiter, {} clients tracked",
                self.rate_limits.tracked_clients()
            );
        }
    }

    /// Get or lazily create a room, honoring `server.max_rooms`.
    ///
    /// A slot is reserved before insertion so concurrent openers of
    /// different rooms cannot overshoot the limit.
    fn open_room(&self, room_id: &RoomId) -> Result<Arc<Room>> {
        if let Some(room) = self.room(room_id) {
            return Ok(room);
        }

        let limit = self.config.server.max_rooms;
        let reserved = self
            .open_slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            });
        if reserved.is_err() {
            // Another task may have opened this very room meanwhile.
            if let Some(room) = self.room(room_id) {
                return Ok(room);
            }
            self.metrics.rejected_total.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Room limit {} reached, refusing {}", limit, room_id);
            return Err(ServerError::RoomLimitReached {
                room_id: room_id.clone(),
                limit,
            });
        }

        let mut created = false;
        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                created = true;
                Arc::new(Room::new(room_id.clone()))
            })
            .value()
            .clone();

        if created {
            self.metrics.rooms_created.fetch_add(1, Ordering::Relaxed);
            tracing::info!("Opened room {}", room_id);
        } else {
            self.open_slots.fetch_sub(1, Ordering::AcqRel);
        }
        Ok(room)
    }
}

/// Reject auth payloads bound to a different room than the request.
///
/// Absent or `null` auth passes; mutators that need it report
/// [`room_types::MutatorError::MissingAuth`] themselves.
fn check_auth_room(room_id: &RoomId, auth: Option<&Value>) -> Result<()> {
    let Some(value) = auth.filter(|v| !v.is_null()) else {
        return Ok(());
    };
    let authorized = AuthData::from_value(Some(value))?.room_id;
    if &authorized != room_id {
        return Err(ServerError::RoomMismatch {
            requested: room_id.clone(),
            authorized,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use room_core::{room_counter_key, EVEN_COUNT_KEY};
    use room_types::{ClientId, MutationRecord, MutatorError};
    use serde_json::json;

    fn request(room: &str, client: &str, mutation: MutationRecord) -> MutationRequest {
        MutationRequest {
            room_id: RoomId::new(room),
            client_id: ClientId::new(client),
            auth: Some(json!({ "userID": "u1", "roomID": room })),
            mutation,
        }
    }

    fn increment(room: &str) -> MutationRequest {
        request(room, "c1", MutationRecord::without_args("increment"))
    }

    #[tokio::test]
    async fn push_creates_room_lazily() {
        let server = RoomServer::new(Config::default(), MutatorRegistry::standard());
        assert_eq!(server.room_count(), 0);
        assert!(server.snapshot(&RoomId::new("A")).await.is_none());

        let version = server.push(increment("A")).await.unwrap();
        assert_eq!(version, Version::new(1));
        assert_eq!(server.room_count(), 1);
        assert_eq!(server.metrics().snapshot().rooms_created, 1);
        assert_eq!(server.metrics().snapshot().mutations_total, 1);
    }

    #[tokio::test]
    async fn rooms_have_separate_stores() {
        let server = RoomServer::new(Config::default(), MutatorRegistry::standard());
        server.push(increment("A")).await.unwrap();
        server.push(increment("A")).await.unwrap();
        server.push(increment("B")).await.unwrap();

        let a = server.snapshot(&RoomId::new("A")).await.unwrap();
        let b = server.snapshot(&RoomId::new("B")).await.unwrap();
        assert_eq!(a.get(&room_counter_key(&RoomId::new("A"))), Some(&json!(2)));
        assert_eq!(a.get(EVEN_COUNT_KEY), Some(&json!(2)));
        assert_eq!(b.get(&room_counter_key(&RoomId::new("B"))), Some(&json!(1)));
        assert_eq!(b.get(EVEN_COUNT_KEY), None);
        assert_eq!(server.room_ids(), vec![RoomId::new("A"), RoomId::new("B")]);
    }

    #[tokio::test]
    async fn failed_mutation_is_counted() {
        let server = RoomServer::new(Config::default(), MutatorRegistry::standard());
        let err = server
            .push(request("A", "c1", MutationRecord::without_args("nope")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServerError::Mutation(MutatorError::UnknownMutator(ref n)) if n == "nope"
        ));
        assert_eq!(server.metrics().snapshot().mutations_failed, 1);
        assert_eq!(
            server.snapshot(&RoomId::new("A")).await,
            Some(BTreeMap::new())
        );
    }

    #[tokio::test]
    async fn oversized_args_are_rejected() {
        let mut config = Config::default();
        config.limits.max_args_bytes = 16;
        let server = RoomServer::new(config, MutatorRegistry::standard());

        let err = server
            .push(request(
                "A",
                "c1",
                MutationRecord::new("setCursor", json!({ "x": 1000000.5, "y": 2000000.5 })),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::ArgsTooLarge { limit: 16, .. }));
        assert_eq!(server.room_count(), 0);
        assert_eq!(server.metrics().snapshot().rejected_total, 1);
    }

    #[tokio::test]
    async fn rate_limit_applies_per_client() {
        let mut config = Config::default();
        config.limits.mutations_per_minute = 2;
        let server = RoomServer::new(config, MutatorRegistry::standard());

        server.push(increment("A")).await.unwrap();
        server.push(increment("A")).await.unwrap();
        let err = server.push(increment("A")).await.unwrap_err();
        assert!(matches!(err, ServerError::RateLimited(_)));
        assert_eq!(server.metrics().snapshot().rate_limit_hits, 1);

        server
            .push(request("A", "c2", MutationRecord::without_args("increment")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn room_limit_is_enforced() {
        let mut config = Config::default();
        config.server.max_rooms = 1;
        let server = RoomServer::new(config, MutatorRegistry::standard());

        server.push(increment("A")).await.unwrap();
        let err = server.push(increment("B")).await.unwrap_err();
        assert!(matches!(err, ServerError::RoomLimitReached { limit: 1, .. }));

        // Existing rooms keep working.
        server.push(increment("A")).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_openers_respect_room_limit() {
        let mut config = Config::default();
        config.server.max_rooms = 3;
        let server = Arc::new(RoomServer::new(config, MutatorRegistry::standard()));

        let mut handles = Vec::new();
        for i in 0..24 {
            let server = Arc::clone(&server);
            let room = format!("room-{}", i);
            handles.push(tokio::spawn(async move {
                let mutation = MutationRecord::without_args("increment");
                server
                    .push(request(&room, &format!("c{}", i), mutation))
                    .await
            }));
        }

        let mut opened = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => opened += 1,
                Err(ServerError::RoomLimitReached { limit: 3, .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(opened, 3);
        assert_eq!(server.room_count(), 3);
        assert_eq!(server.metrics().snapshot().rooms_created, 3);
    }

    #[tokio::test]
    async fn auth_for_another_room_is_rejected() {
        let server = RoomServer::new(Config::default(), MutatorRegistry::standard());
        let mut req = increment("A");
        req.auth = Some(json!({ "userID": "u1", "roomID": "B" }));

        let err = server.push(req).await.unwrap_err();
        assert!(matches!(err, ServerError::RoomMismatch { .. }));
        assert_eq!(server.room_count(), 0);
        assert_eq!(server.metrics().snapshot().rejected_total, 1);
    }

    #[tokio::test]
    async fn limiter_is_swept_periodically() {
        let mut config = Config::default();
        config.limits.mutations_per_minute = 6000;
        config.limits.limiter_sweep_every = 2;
        let server = RoomServer::new(config, MutatorRegistry::standard());

        server
            .push(request("A", "early", MutationRecord::without_args("increment")))
            .await
            .unwrap();
        assert_eq!(server.rate_limits().tracked_clients(), 1);

        // One cell recharges in 10ms at this rate.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        server
            .push(request("A", "late", MutationRecord::without_args("increment")))
            .await
            .unwrap();
        assert_eq!(server.rate_limits().tracked_clients(), 1);
    }
}
