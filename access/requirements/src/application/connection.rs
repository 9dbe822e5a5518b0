// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Managed Connection
//!
//! The default [`Connection`]: a controller mode plus the oracle and
//! enumerator answering remote queries, and the evaluation state of every
//! requirement checked through it.
//!
//! On [`ManagedConnection::disconnect`] listeners are notified first, then
//! the epoch advances so nothing computed before the loss is reused.

use std::sync::Arc;

use mgmt_access_core::domain::environment::ControllerMode;
use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::domain::connection::{Connection, ConnectionId, DisconnectListener};
use crate::domain::oracle::{Enumerator, Oracle};
use crate::domain::state::EvaluationStore;

pub struct ManagedConnection {
    id: ConnectionId,
    mode: RwLock<ControllerMode>,
    oracle: Arc<dyn Oracle>,
    enumerator: Arc<dyn Enumerator>,
    store: EvaluationStore,
    listeners: Mutex<Vec<Arc<dyn DisconnectListener>>>,
}

impl ManagedConnection {
    pub fn new(mode: ControllerMode, oracle: Arc<dyn Oracle>, enumerator: Arc<dyn Enumerator>) -> Self {
        Self {
            id: ConnectionId::new(),
            mode: RwLock::new(mode),
            oracle,
            enumerator,
            store: EvaluationStore::new(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Signal loss of the connection. Returns the new epoch.
    pub fn disconnect(&self) -> u64 {
        let listeners = self.listeners.lock().clone();
        for listener in &listeners {
            listener.on_disconnected(self);
        }
        let epoch = self.store.advance_epoch();
        info!(connection = %self.id, epoch, listeners = listeners.len(), "Connection lost");
        epoch
    }

    /// Re-establish the connection, possibly to a controller in another mode.
    /// A mode change counts as a disconnect: results cached under the old
    /// mode are discarded.
    pub fn reconnect(&self, mode: ControllerMode) {
        let previous = std::mem::replace(&mut *self.mode.write(), mode);
        if previous != mode {
            self.disconnect();
        }
        info!(connection = %self.id, mode = %mode, "Connection established");
    }
}

impl Connection for ManagedConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn current_mode(&self) -> ControllerMode {
        *self.mode.read()
    }

    fn oracle(&self) -> &dyn Oracle {
        self.oracle.as_ref()
    }

    fn enumerator(&self) -> &dyn Enumerator {
        self.enumerator.as_ref()
    }

    fn evaluation_store(&self) -> &EvaluationStore {
        &self.store
    }

    fn subscribe(&self, listener: Arc<dyn DisconnectListener>) {
        self.listeners.lock().push(listener);
    }
}
