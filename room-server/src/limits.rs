//! Rate limiting for the room host.
//!
//! Mutations are limited per client id using governor's keyed rate limiter
//! backed by DashMap.

use crate::config::LimitsConfig;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use room_types::ClientId;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Type alias for a keyed rate limiter using DashMap.
type KeyedLimiter<K> = RateLimiter<
    K,
    dashmap::DashMap<K, InMemoryState>,
    DefaultClock,
    NoOpMiddleware<governor::clock::QuantaInstant>,
>;

/// Rate limiters for the room host.
#[derive(Clone)]
pub struct RateLimits {
    /// Limits mutations per client.
    ///
    /// Configured via `limits.mutations_per_minute`.
    mutation_limiter: Arc<KeyedLimiter<ClientId>>,
}

impl std::fmt::Debug for RateLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimits")
            .field("mutation_limiter", &"KeyedLimiter<ClientId>")
            .field("tracked_clients", &self.mutation_limiter.len())
            .finish()
    }
}

impl RateLimits {
    /// Create rate limiters from configuration.
    ///
    /// A zero rate is treated as one per minute; [`crate::config::Config::validate`]
    /// rejects it before it gets here.
    pub fn new(config: &LimitsConfig) -> Self {
        let per_minute = NonZeroU32::new(config.mutations_per_minute).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(per_minute);

        Self {
            mutation_limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Check if a client may run another mutation.
    pub fn check_mutation(&self, client_id: &ClientId) -> Result<(), RateLimitError> {
        self.mutation_limiter
            .check_key(client_id)
            .map_err(|_| RateLimitError::MutationLimitExceeded {
                client_id: client_id.clone(),
            })
    }

    /// Get the number of tracked client keys (for metrics).
    pub fn tracked_clients(&self) -> usize {
        self.mutation_limiter.len()
    }

    /// Evict entries of clients whose quota has fully recharged.
    pub fn shrink(&self) {
        self.mutation_limiter.retain_recent();
    }
}

/// Rate limit error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    /// Too many mutations from this client.
    #[error("mutation rate limit exceeded for client {client_id}")]
    MutationLimitExceeded {
        /// Offending client.
        client_id: ClientId,
    },
}
