// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Constraint Registry
//!
//! Process-wide, append-only set of canonical [`AccessConstraintDefinition`]s.
//! Registration is insert-if-absent by [`ConstraintKey`]: registering an
//! equal definition returns the instance already stored, so every subsystem
//! shares one `Arc` per constraint. There is no removal.
//!
//! Subsystems may register concurrently during initialization; reads after
//! canonicalization take only a shard read lock.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::domain::constraint::{AccessConstraintDefinition, ConstraintKey, ConstraintKind};
use crate::domain::events::AccessEvent;
use crate::infrastructure::audit::AccessAuditLogger;

static GLOBAL: Lazy<ConstraintRegistry> = Lazy::new(ConstraintRegistry::new);

#[derive(Debug, Default)]
pub struct ConstraintRegistry {
    definitions: DashMap<ConstraintKey, Arc<AccessConstraintDefinition>>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process.
    pub fn global() -> &'static ConstraintRegistry {
        &GLOBAL
    }

    /// Register `definition`, returning the canonical instance for its key.
    pub fn register(&self, definition: AccessConstraintDefinition) -> Arc<AccessConstraintDefinition> {
        let key = definition.key();
        let mut inserted = false;
        let canonical = self
            .definitions
            .entry(key.clone())
            .or_insert_with(|| {
                inserted = true;
                Arc::new(definition)
            })
            .clone();
        if inserted {
            AccessAuditLogger::new().record(&AccessEvent::ConstraintRegistered {
                key: key.to_string(),
                registered_at: Utc::now(),
            });
        }
        canonical
    }

    pub fn get(&self, key: &ConstraintKey) -> Option<Arc<AccessConstraintDefinition>> {
        self.definitions.get(key).map(|entry| entry.value().clone())
    }

    pub fn find_by_name(&self, kind: ConstraintKind, name: &str) -> Vec<Arc<AccessConstraintDefinition>> {
        let mut found: Vec<_> = self
            .definitions
            .iter()
            .filter(|entry| entry.key().kind == kind && entry.key().name == name)
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|definition| definition.key());
        found
    }

    /// Every registered definition, ordered by key.
    pub fn definitions(&self) -> Vec<Arc<AccessConstraintDefinition>> {
        let mut all: Vec<_> = self
            .definitions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|definition| definition.key());
        all
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraint::ConstraintOwner;

    #[test]
    fn test_register_is_idempotent_and_shares_instance() {
        let registry = ConstraintRegistry::new();
        let first = registry.register(
            AccessConstraintDefinition::new(ConstraintKind::Sensitivity, ConstraintOwner::Core, "credential")
                .with_description("first"),
        );
        let second = registry.register(
            AccessConstraintDefinition::new(ConstraintKind::Sensitivity, ConstraintOwner::Core, "credential")
                .with_description("second"),
        );
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.description(), Some("first"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_registration_yields_one_canonical_instance() {
        let registry = Arc::new(ConstraintRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry.register(AccessConstraintDefinition::new(
                        ConstraintKind::Application,
                        ConstraintOwner::Subsystem("messaging".into()),
                        "queue",
                    ))
                })
            })
            .collect();
        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.find_by_name(ConstraintKind::Application, "queue").len(), 1);
    }
}
