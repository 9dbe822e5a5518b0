// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Requirement Evaluation
//!
//! Every node memoizes its result in the connection's evaluation store for
//! the current epoch, so repeated checks cost one remote round trip per
//! leaf until the connection is lost.

use futures::future::{BoxFuture, FutureExt};
use mgmt_access_core::domain::address::PathAddress;
use tracing::trace;

use crate::application::enumeration::{probe, HostServerQuantifier, PerNodeQuantifier};
use crate::domain::connection::Connection;
use crate::domain::requirement::{Requirement, RequirementKind};
use crate::domain::state::EvaluationStore;

impl Requirement {
    /// Whether the requirement holds on `conn`.
    ///
    /// Composites evaluate children in order and short-circuit. Remote
    /// failures count as "not allowed" and are never returned.
    pub fn is_satisfied<'a>(&'a self, conn: &'a dyn Connection) -> BoxFuture<'a, bool> {
        async move {
            let store = conn.evaluation_store();
            if let Some(satisfied) = store.memoized(self.id()) {
                return satisfied;
            }
            let epoch = store.epoch();

            let satisfied = match self.kind() {
                RequirementKind::Always => true,
                RequirementKind::Operation { address, operation } => {
                    probe(conn, &PathAddress::root(), address, operation).await
                }
                RequirementKind::ControllerMode { mode, inner } => {
                    conn.current_mode() == *mode && inner.is_satisfied(conn).await
                }
                RequirementKind::AllOf(children) => {
                    let mut all = true;
                    for child in children {
                        if !child.is_satisfied(conn).await {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                RequirementKind::AnyOf(children) => {
                    let mut any = false;
                    for child in children {
                        if child.is_satisfied(conn).await {
                            any = true;
                            break;
                        }
                    }
                    any
                }
                RequirementKind::PerNode {
                    parent,
                    node_type,
                    address,
                    operation,
                } => {
                    PerNodeQuantifier {
                        id: self.id(),
                        parent,
                        node_type,
                        address,
                        operation,
                    }
                    .is_satisfied(conn)
                    .await
                }
                RequirementKind::HostServer { address, operation } => {
                    HostServerQuantifier {
                        id: self.id(),
                        address,
                        operation,
                    }
                    .is_satisfied(conn)
                    .await
                }
            };

            trace!(connection = %conn.id(), requirement = %self, satisfied, "Requirement evaluated");
            store.memoize(self.id(), epoch, satisfied);
            satisfied
        }
        .boxed()
    }

    /// Instances of a per-node quantifier that permit its operation, in
    /// enumeration order. `None` for any other kind of node.
    pub async fn allowed(&self, conn: &dyn Connection) -> Option<Vec<String>> {
        match self.kind() {
            RequirementKind::PerNode {
                parent,
                node_type,
                address,
                operation,
            } => {
                let quantifier = PerNodeQuantifier {
                    id: self.id(),
                    parent,
                    node_type,
                    address,
                    operation,
                };
                Some(quantifier.allowed(conn).await)
            }
            _ => None,
        }
    }

    /// Hosts with at least one server permitting the operation of a
    /// host/server quantifier. `None` for any other kind of node.
    pub async fn allowed_hosts(&self, conn: &dyn Connection) -> Option<Vec<String>> {
        match self.kind() {
            RequirementKind::HostServer { address, operation } => {
                let quantifier = HostServerQuantifier {
                    id: self.id(),
                    address,
                    operation,
                };
                Some(quantifier.allowed_hosts(conn).await)
            }
            _ => None,
        }
    }

    /// Servers of `host` permitting the operation of a host/server
    /// quantifier. `None` for any other kind of node.
    pub async fn allowed_servers(&self, conn: &dyn Connection, host: &str) -> Option<Vec<String>> {
        match self.kind() {
            RequirementKind::HostServer { address, operation } => {
                let quantifier = HostServerQuantifier {
                    id: self.id(),
                    address,
                    operation,
                };
                Some(quantifier.allowed_servers(conn, host).await)
            }
            _ => None,
        }
    }

    /// Discard this node's state in `store`, and that of every descendant.
    pub fn on_disconnected(&self, store: &EvaluationStore) {
        store.reset(self.id());
        for child in self.children() {
            child.on_disconnected(store);
        }
    }
}
