// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Enumeration Engine
//!
//! Evaluates the quantifier requirements. Each quantifier answers two
//! questions against the same scan state:
//!
//! - *is any instance allowed?* scans in enumeration order and stops at the
//!   first allowed instance
//! - *which instances are allowed?* resumes the scan from where the first
//!   question stopped and completes it
//!
//! so every instance is probed at most once per connection epoch, whichever
//! question is asked first.
//!
//! Remote failures never escape: an enumerator failure yields no instances
//! and an oracle failure denies that one instance. Both are logged at `warn`.

use mgmt_access_core::domain::address::{PathAddress, PathElement};
use tracing::{debug, warn};

use crate::domain::connection::Connection;
use crate::domain::requirement::RequirementId;
use crate::domain::state::{HostServerState, NodeScan, PerNodeState, ScanState};

const HOST: &str = "host";
const SERVER: &str = "server";

/// Ask the oracle, treating any failure as a denial.
pub(crate) async fn probe(
    conn: &dyn Connection,
    scope: &PathAddress,
    address: &PathAddress,
    operation: &str,
) -> bool {
    match conn.oracle().is_executable(scope, address, operation).await {
        Ok(allowed) => allowed,
        Err(e) => {
            warn!(
                connection = %conn.id(),
                scope = %scope,
                address = %address,
                operation,
                error = %e,
                "Remote query failed; treating instance as denied"
            );
            false
        }
    }
}

async fn list(conn: &dyn Connection, parent: &PathAddress, node_type: &str) -> Vec<String> {
    match conn.enumerator().list_child_names(parent, node_type).await {
        Ok(names) => names,
        Err(e) => {
            warn!(
                connection = %conn.id(),
                parent = %parent,
                node_type,
                error = %e,
                "Enumeration failed; treating as no instances"
            );
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    /// Stop at the first allowed instance.
    FirstMatch,
    /// Probe every remaining instance.
    Exhaustive,
}

/// What a quantifier probes for each instance.
struct InstanceProbe<'a> {
    parent: &'a PathAddress,
    node_type: &'a str,
    address: &'a PathAddress,
    operation: &'a str,
}

impl InstanceProbe<'_> {
    /// Continue `scan` from its cursor. Returns whether any instance scanned
    /// so far is allowed.
    async fn advance(&self, conn: &dyn Connection, scan: &mut NodeScan, mode: ScanMode) -> bool {
        if mode == ScanMode::FirstMatch && scan.any_allowed() {
            return true;
        }
        while let Some(name) = scan.next_unchecked() {
            let scope = self
                .parent
                .append(PathElement::new(self.node_type, name));
            let allowed = probe(conn, &scope, self.address, self.operation).await;
            scan.record(allowed);
            if allowed && mode == ScanMode::FirstMatch {
                return true;
            }
        }
        scan.any_allowed()
    }
}

fn take_per_node(conn: &dyn Connection, id: RequirementId) -> PerNodeState {
    match conn.evaluation_store().take_scan(id) {
        Some(ScanState::PerNode(state)) => state,
        _ => PerNodeState::default(),
    }
}

fn take_host_server(conn: &dyn Connection, id: RequirementId) -> HostServerState {
    match conn.evaluation_store().take_scan(id) {
        Some(ScanState::HostServer(state)) => state,
        _ => HostServerState::default(),
    }
}

pub(crate) struct PerNodeQuantifier<'a> {
    pub id: RequirementId,
    pub parent: &'a PathAddress,
    pub node_type: &'a str,
    pub address: &'a PathAddress,
    pub operation: &'a str,
}

impl PerNodeQuantifier<'_> {
    fn instance_probe(&self) -> InstanceProbe<'_> {
        InstanceProbe {
            parent: self.parent,
            node_type: self.node_type,
            address: self.address,
            operation: self.operation,
        }
    }

    async fn scan(&self, conn: &dyn Connection, state: &mut PerNodeState) -> NodeScan {
        match state.scan.take() {
            Some(scan) => scan,
            None => NodeScan::new(list(conn, self.parent, self.node_type).await),
        }
    }

    pub async fn is_satisfied(&self, conn: &dyn Connection) -> bool {
        let epoch = conn.evaluation_store().epoch();
        let mut state = take_per_node(conn, self.id);
        let mut scan = self.scan(conn, &mut state).await;
        let found = self
            .instance_probe()
            .advance(conn, &mut scan, ScanMode::FirstMatch)
            .await;
        debug!(node_type = self.node_type, phase = ?scan.phase(), found, "Per-node scan");
        state.scan = Some(scan);
        conn.evaluation_store()
            .put_scan(self.id, epoch, ScanState::PerNode(state));
        found
    }

    pub async fn allowed(&self, conn: &dyn Connection) -> Vec<String> {
        let store = conn.evaluation_store();
        let epoch = store.epoch();
        let mut state = take_per_node(conn, self.id);
        let allowed = match &state.allowed {
            Some(allowed) => allowed.clone(),
            None => {
                let mut scan = self.scan(conn, &mut state).await;
                self.instance_probe()
                    .advance(conn, &mut scan, ScanMode::Exhaustive)
                    .await;
                let allowed = scan.allowed();
                state.scan = Some(scan);
                state.allowed = Some(allowed.clone());
                store.memoize(self.id, epoch, !allowed.is_empty());
                allowed
            }
        };
        store.put_scan(self.id, epoch, ScanState::PerNode(state));
        allowed
    }
}

pub(crate) struct HostServerQuantifier<'a> {
    pub id: RequirementId,
    pub address: &'a PathAddress,
    pub operation: &'a str,
}

impl HostServerQuantifier<'_> {
    async fn ensure_hosts(&self, conn: &dyn Connection, state: &mut HostServerState) {
        if state.hosts.is_none() {
            let hosts = list(conn, &PathAddress::root(), HOST).await;
            state.servers = vec![None; hosts.len()];
            state.hosts = Some(hosts);
        }
    }

    /// Advance the server scan of host `index`.
    async fn scan_host(
        &self,
        conn: &dyn Connection,
        state: &mut HostServerState,
        index: usize,
        mode: ScanMode,
    ) -> bool {
        let Some(host) = state.hosts.as_ref().and_then(|hosts| hosts.get(index)).cloned() else {
            return false;
        };
        let parent = PathAddress::root().append(PathElement::new(HOST, host));
        let mut scan = match state.servers[index].take() {
            Some(scan) => scan,
            None => NodeScan::new(list(conn, &parent, SERVER).await),
        };
        let probe = InstanceProbe {
            parent: &parent,
            node_type: SERVER,
            address: self.address,
            operation: self.operation,
        };
        let found = probe.advance(conn, &mut scan, mode).await;
        let complete = scan.is_complete();
        state.servers[index] = Some(scan);
        if complete {
            state.deferred.remove(&index);
        }
        found
    }

    pub async fn is_satisfied(&self, conn: &dyn Connection) -> bool {
        let store = conn.evaluation_store();
        let epoch = store.epoch();
        let mut state = take_host_server(conn, self.id);
        self.ensure_hosts(conn, &mut state).await;

        let mut found = state.any_allowed();
        let host_count = state.servers.len();
        while !found && state.cursor < host_count {
            let index = state.cursor;
            found = self.scan_host(conn, &mut state, index, ScanMode::FirstMatch).await;
            let complete = state.servers[index]
                .as_ref()
                .is_some_and(NodeScan::is_complete);
            if complete {
                state.cursor += 1;
            }
            if found {
                let unscanned: Vec<usize> = (index + 1..host_count)
                    .filter(|&i| state.servers[i].is_none())
                    .collect();
                state.deferred.extend(unscanned);
            }
        }
        debug!(
            cursor = state.cursor,
            deferred = ?state.deferred,
            found,
            "Host/server scan"
        );
        store.put_scan(self.id, epoch, ScanState::HostServer(state));
        found
    }

    /// Hosts with at least one allowed server, completing every deferred or
    /// partial host scan.
    pub async fn allowed_hosts(&self, conn: &dyn Connection) -> Vec<String> {
        let store = conn.evaluation_store();
        let epoch = store.epoch();
        let mut state = take_host_server(conn, self.id);

        let allowed = match &state.allowed_hosts {
            Some(allowed) => allowed.clone(),
            None => {
                self.ensure_hosts(conn, &mut state).await;
                let host_count = state.servers.len();
                for index in 0..host_count {
                    if state.deferred.contains(&index) {
                        debug!(host_index = index, "Completing deferred host scan");
                    }
                    self.scan_host(conn, &mut state, index, ScanMode::Exhaustive).await;
                }
                state.cursor = host_count;
                let allowed: Vec<String> = state
                    .hosts
                    .iter()
                    .flatten()
                    .zip(&state.servers)
                    .filter(|(_, scan)| scan.as_ref().is_some_and(NodeScan::any_allowed))
                    .map(|(host, _)| host.clone())
                    .collect();
                state.allowed_hosts = Some(allowed.clone());
                store.memoize(self.id, epoch, !allowed.is_empty());
                allowed
            }
        };
        store.put_scan(self.id, epoch, ScanState::HostServer(state));
        allowed
    }

    /// Allowed servers of `host`, completing only that host's scan.
    pub async fn allowed_servers(&self, conn: &dyn Connection, host: &str) -> Vec<String> {
        let store = conn.evaluation_store();
        let epoch = store.epoch();
        let mut state = take_host_server(conn, self.id);
        self.ensure_hosts(conn, &mut state).await;

        let allowed = match state.host_index(host) {
            Some(index) => {
                self.scan_host(conn, &mut state, index, ScanMode::Exhaustive).await;
                state.servers[index]
                    .as_ref()
                    .map(NodeScan::allowed)
                    .unwrap_or_default()
            }
            None => Vec::new(),
        };
        store.put_scan(self.id, epoch, ScanState::HostServer(state));
        allowed
    }
}
