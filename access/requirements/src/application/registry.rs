// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Requirement trees known to a console, reset together when a connection
//! is lost.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::connection::{Connection, DisconnectListener};
use crate::domain::requirement::Requirement;

#[derive(Debug, Default)]
pub struct RequirementRegistry {
    requirements: RwLock<Vec<Arc<Requirement>>>,
}

impl RequirementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, requirement: Arc<Requirement>) -> Arc<Requirement> {
        self.requirements.write().push(requirement.clone());
        requirement
    }

    pub fn len(&self) -> usize {
        self.requirements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DisconnectListener for RequirementRegistry {
    /// Resets every registered tree node by node. `ManagedConnection` also
    /// advances its epoch, which clears the whole store; this reset serves
    /// `Connection` implementations that keep a single epoch.
    fn on_disconnected(&self, connection: &dyn Connection) {
        let requirements = self.requirements.read();
        let store = connection.evaluation_store();
        for requirement in requirements.iter() {
            requirement.on_disconnected(store);
        }
        debug!(
            connection = %connection.id(),
            requirements = requirements.len(),
            "Requirement state reset"
        );
    }
}
