// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Local Controller
//!
//! Answers remote queries in-process: the oracle is the server-side access
//! check service and the enumerator walks the configured topology. Children
//! the caller may not address are left out of every listing, as a remote
//! controller would.
//!
//! Hosts can be marked unreachable; every query touching one fails with a
//! transport error.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use mgmt_access_core::application::access_service::AccessCheckService;
use mgmt_access_core::domain::address::{PathAddress, PathElement};
use mgmt_access_core::domain::caller::Caller;
use mgmt_access_core::domain::environment::{ControllerMode, Environment};
use parking_lot::RwLock;
use tracing::debug;

use crate::application::connection::ManagedConnection;
use crate::domain::oracle::{Enumerator, Oracle, QueryError};

pub struct LocalController {
    service: AccessCheckService,
    caller: Caller,
    environment: Environment,
    unreachable: RwLock<BTreeSet<String>>,
}

impl LocalController {
    pub fn new(service: AccessCheckService, caller: Caller, environment: Environment) -> Self {
        Self {
            service,
            caller,
            environment,
            unreachable: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn mode(&self) -> ControllerMode {
        self.service.resources().mode()
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Make every query under `/host=<host>` fail.
    pub fn set_unreachable<I, S>(&self, hosts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unreachable = self.unreachable.write();
        unreachable.clear();
        unreachable.extend(hosts.into_iter().map(Into::into));
    }

    /// A new connection to this controller.
    pub fn connect(self: &Arc<Self>) -> ManagedConnection {
        ManagedConnection::new(self.mode(), self.clone(), self.clone())
    }

    fn check_reachable(&self, address: &PathAddress) -> Result<(), QueryError> {
        match address.value_of("host") {
            Some(host) if self.unreachable.read().contains(host) => {
                Err(QueryError::Transport(format!("host '{}' is unreachable", host)))
            }
            _ => Ok(()),
        }
    }

    fn visible_children(&self, parent: &PathAddress, node_type: &str, names: Vec<String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| {
                let child = parent.append(PathElement::new(node_type, name.as_str()));
                self.service
                    .visible_address(&self.caller, &self.environment, &child)
                    .fully_visible
            })
            .collect()
    }
}

#[async_trait]
impl Oracle for LocalController {
    async fn is_executable(
        &self,
        scope: &PathAddress,
        address: &PathAddress,
        operation: &str,
    ) -> Result<bool, QueryError> {
        let full = scope.join(address);
        self.check_reachable(&full)?;
        let allowed = self
            .service
            .is_executable(&self.caller, &self.environment, &full, operation);
        debug!(caller = self.caller.name(), address = %full, operation, allowed, "Local probe");
        Ok(allowed)
    }
}

#[async_trait]
impl Enumerator for LocalController {
    async fn list_child_names(&self, parent: &PathAddress, node_type: &str) -> Result<Vec<String>, QueryError> {
        self.check_reachable(parent)?;
        let topology = self.service.resources().topology();
        let names = match (parent.is_empty(), node_type) {
            (true, "host") if topology.mode == ControllerMode::Domain => topology.host_names(),
            (true, "server-group") if topology.mode == ControllerMode::Domain => topology.server_groups.clone(),
            (false, "server") | (false, "server-config") if parent.len() == 1 => {
                let host = parent.value_of("host").ok_or_else(|| QueryError::UnknownNode {
                    address: parent.clone(),
                    node_type: node_type.to_string(),
                })?;
                topology
                    .server_names(host)
                    .ok_or_else(|| QueryError::UnknownNode {
                        address: parent.clone(),
                        node_type: node_type.to_string(),
                    })?
            }
            _ => Vec::new(),
        };
        Ok(self.visible_children(parent, node_type, names))
    }
}
