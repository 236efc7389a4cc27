//! Mutator registry.
//!
//! The registry is the fixed set of mutators handed to the runtime at
//! startup. It is built once through [`RegistryBuilder`] and is immutable
//! afterwards; clones share the same table.

use room_types::{MutatorError, MutatorResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::mutator::Mutator;
use crate::mutators::{Increment, InitClientState, SetCursor};
use crate::transaction::WriteTransaction;

/// Immutable name → mutator table.
#[derive(Clone)]
pub struct MutatorRegistry {
    mutators: Arc<BTreeMap<&'static str, Arc<dyn Mutator>>>,
}

impl MutatorRegistry {
    /// The application's mutators: `increment`, `initClientState`, `setCursor`.
    pub fn standard() -> Self {
        let standard: [Arc<dyn Mutator>; 3] = [
            Arc::new(SetCursor),
            Arc::new(InitClientState),
            Arc::new(Increment),
        ];
        let mutators = standard
            .into_iter()
            .map(|mutator| (mutator.name(), mutator))
            .collect();
        Self {
            mutators: Arc::new(mutators),
        }
    }

    /// Start building a custom registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a mutator by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Mutator>> {
        self.mutators.get(name)
    }

    /// Check if a mutator is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.mutators.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.mutators.keys().copied().collect()
    }

    /// Number of registered mutators.
    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }

    /// Run the mutator registered under `name`.
    pub async fn invoke(
        &self,
        name: &str,
        tx: &mut dyn WriteTransaction,
        args: Value,
    ) -> MutatorResult<()> {
        let mutator = self
            .get(name)
            .ok_or_else(|| MutatorError::UnknownMutator(name.to_string()))?;

        tracing::debug!(
            "Running mutator {} for client {} ({} pass)",
            name,
            tx.client_id(),
            tx.location()
        );

        mutator.apply(tx, args).await
    }
}

impl Default for MutatorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for MutatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutatorRegistry")
            .field("mutators", &self.names())
            .finish()
    }
}

/// Builder for a [`MutatorRegistry`].
///
/// Registration errors are reported by [`RegistryBuilder::build`].
#[derive(Default)]
pub struct RegistryBuilder {
    mutators: BTreeMap<&'static str, Arc<dyn Mutator>>,
    duplicate: Option<&'static str>,
}

impl RegistryBuilder {
    /// Add a mutator.
    pub fn register<M: Mutator + 'static>(mut self, mutator: M) -> Self {
        let name = mutator.name();
        if self.mutators.insert(name, Arc::new(mutator)).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(name);
        }
        self
    }

    /// Add the application's standard mutators.
    pub fn with_standard(self) -> Self {
        self.register(SetCursor)
            .register(InitClientState)
            .register(Increment)
    }

    /// Freeze the registry.
    pub fn build(self) -> MutatorResult<MutatorRegistry> {
        if let Some(name) = self.duplicate {
            return Err(MutatorError::DuplicateMutator(name.to_string()));
        }
        Ok(MutatorRegistry {
            mutators: Arc::new(self.mutators),
        })
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("mutators", &self.mutators.keys().collect::<Vec<_>>())
            .field("duplicate", &self.duplicate)
            .finish()
    }
}
