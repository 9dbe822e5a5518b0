// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;
use std::sync::Arc;

use mgmt_access_core::domain::environment::ControllerMode;
use uuid::Uuid;

use super::oracle::{Enumerator, Oracle};
use super::state::EvaluationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notified when a connection is lost, before its evaluation state is
/// discarded.
pub trait DisconnectListener: Send + Sync {
    fn on_disconnected(&self, connection: &dyn Connection);
}

/// A client's link to one management controller.
///
/// Each connection owns the evaluation state of every requirement evaluated
/// against it; requirement trees themselves are shared and immutable.
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    fn current_mode(&self) -> ControllerMode;

    fn oracle(&self) -> &dyn Oracle;

    fn enumerator(&self) -> &dyn Enumerator;

    fn evaluation_store(&self) -> &EvaluationStore;

    fn subscribe(&self, listener: Arc<dyn DisconnectListener>);
}
