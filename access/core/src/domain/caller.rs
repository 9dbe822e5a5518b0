// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Callers and Role Scoping
//!
//! A [`Caller`] is an authenticated identity with role mappings. A mapping is
//! either global or scoped to a set of hosts or server groups. Scoped roles
//! follow a read-global / write-scoped rule:
//!
//! | target effect | scope covers it | [`ScopeMatch`] |
//! |---------------|-----------------|----------------|
//! | absent or global | n/a | `ReadOnly` |
//! | explicit hosts/groups | yes | `Full` |
//! | explicit hosts/groups | no | `None` |
//!
//! Scoped roles never apply on a standalone server.

use std::collections::BTreeSet;

use super::environment::Environment;
use super::target::{HostEffect, ServerGroupEffect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleScope {
    Global,
    Hosts(BTreeSet<String>),
    ServerGroups(BTreeSet<String>),
}

/// How much of a role applies to a particular target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMatch {
    /// Every effect the role grants.
    Full,
    /// Only `address` and the read effects.
    ReadOnly,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMapping {
    role: String,
    scope: RoleScope,
}

impl RoleMapping {
    pub fn global(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            scope: RoleScope::Global,
        }
    }

    pub fn hosts<I, S>(role: impl Into<String>, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            scope: RoleScope::Hosts(hosts.into_iter().map(Into::into).collect()),
        }
    }

    pub fn server_groups<I, S>(role: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            scope: RoleScope::ServerGroups(groups.into_iter().map(Into::into).collect()),
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn scope(&self) -> &RoleScope {
        &self.scope
    }

    pub fn applicability(
        &self,
        environment: &Environment,
        host_effect: Option<&HostEffect>,
        server_group_effect: Option<&ServerGroupEffect>,
    ) -> ScopeMatch {
        match &self.scope {
            RoleScope::Global => ScopeMatch::Full,
            _ if environment.is_standalone() => ScopeMatch::None,
            RoleScope::Hosts(scope) => match host_effect {
                None => ScopeMatch::ReadOnly,
                Some(effect) if effect.is_global() => ScopeMatch::ReadOnly,
                Some(effect) => covered(effect.affected_hosts(), scope),
            },
            RoleScope::ServerGroups(scope) => match server_group_effect {
                None => ScopeMatch::ReadOnly,
                Some(effect) if effect.is_global() => ScopeMatch::ReadOnly,
                Some(effect) => covered(effect.affected_groups(), scope),
            },
        }
    }
}

fn covered(affected: &BTreeSet<String>, scope: &BTreeSet<String>) -> ScopeMatch {
    if !affected.is_empty() && affected.is_subset(scope) {
        ScopeMatch::Full
    } else {
        ScopeMatch::None
    }
}

/// An authenticated identity and its role mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    name: String,
    roles: Vec<RoleMapping>,
}

impl Caller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: RoleMapping) -> Self {
        self.roles.push(mapping);
        self
    }

    pub fn with_role(self, role: impl Into<String>) -> Self {
        self.with_mapping(RoleMapping::global(role))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &[RoleMapping] {
        &self.roles
    }
}
