// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Managed domain topology: hosts, the servers they run, and server groups.
//!
//! Order is preserved exactly as configured; enumeration of hosts and
//! servers follows it.

use serde::{Deserialize, Serialize};

use super::environment::ControllerMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSpec {
    pub name: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpec {
    pub name: String,
    #[serde(default)]
    pub servers: Vec<ServerSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub mode: ControllerMode,
    #[serde(default)]
    pub hosts: Vec<HostSpec>,
    #[serde(default)]
    pub server_groups: Vec<String>,
}

impl Topology {
    pub fn standalone() -> Self {
        Self::default()
    }

    pub fn host(&self, name: &str) -> Option<&HostSpec> {
        self.hosts.iter().find(|h| h.name == name)
    }

    pub fn host_names(&self) -> Vec<String> {
        self.hosts.iter().map(|h| h.name.clone()).collect()
    }

    pub fn server_names(&self, host: &str) -> Option<Vec<String>> {
        self.host(host)
            .map(|h| h.servers.iter().map(|s| s.name.clone()).collect())
    }

    pub fn group_of(&self, host: &str, server: &str) -> Option<&str> {
        self.host(host)?
            .servers
            .iter()
            .find(|s| s.name == server)
            .map(|s| s.group.as_str())
    }

    pub fn has_server_group(&self, group: &str) -> bool {
        self.server_groups.iter().any(|g| g == group)
    }
}
