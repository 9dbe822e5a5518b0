// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Authorization Targets
//!
//! What an [`super::action::Action`] is aimed at. Three shapes exist:
//!
//! | Variant | Contents |
//! |---------|----------|
//! | [`TargetResource`] | address, optional domain scoping, applicable constraints |
//! | [`TargetAttribute`] | a resource target plus one attribute and its own constraints |
//! | [`JmxTarget`] | MBean method call, optionally scoped to hosts/server groups |
//!
//! Domain scoping is carried by [`HostEffect`] and [`ServerGroupEffect`]:
//! either the resource affects every host (group), or an explicit set of
//! them. Scoped roles are evaluated against these.
//!
//! ## Invariants
//!
//! - A target's constraint list is fixed at construction; there is no mutable
//!   accessor. Effects are never cached on a target.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::address::PathAddress;
use super::constraint::AccessConstraintDefinition;

/// How a resource relates to the hosts of a managed domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEffect {
    address: PathAddress,
    global: bool,
    server_effect: bool,
    hosts: BTreeSet<String>,
}

impl HostEffect {
    /// The resource affects every host (domain-wide configuration).
    pub fn global(address: PathAddress) -> Self {
        Self {
            address,
            global: true,
            server_effect: false,
            hosts: BTreeSet::new(),
        }
    }

    pub fn hosts<I, S>(address: PathAddress, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            address,
            global: false,
            server_effect: false,
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    /// The resource denotes one specific server on `host`.
    pub fn server(address: PathAddress, host: impl Into<String>) -> Self {
        Self {
            server_effect: true,
            ..Self::hosts(address, [host])
        }
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Informational: set for addresses naming a single server. Host
    /// scoping is decided by `affected_hosts` alone.
    pub fn is_server_effect(&self) -> bool {
        self.server_effect
    }

    pub fn affected_hosts(&self) -> &BTreeSet<String> {
        &self.hosts
    }

    pub fn resource_address(&self) -> &PathAddress {
        &self.address
    }
}

/// How a resource relates to the server groups of a managed domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerGroupEffect {
    address: PathAddress,
    global: bool,
    groups: BTreeSet<String>,
}

impl ServerGroupEffect {
    pub fn global(address: PathAddress) -> Self {
        Self {
            address,
            global: true,
            groups: BTreeSet::new(),
        }
    }

    pub fn groups<I, S>(address: PathAddress, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            address,
            global: false,
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn affected_groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    pub fn resource_address(&self) -> &PathAddress {
        &self.address
    }
}

/// A whole management resource.
#[derive(Debug, Clone)]
pub struct TargetResource {
    address: PathAddress,
    host_effect: Option<HostEffect>,
    server_group_effect: Option<ServerGroupEffect>,
    constraints: Vec<Arc<AccessConstraintDefinition>>,
}

impl TargetResource {
    pub fn new(address: PathAddress, constraints: Vec<Arc<AccessConstraintDefinition>>) -> Self {
        Self {
            address,
            host_effect: None,
            server_group_effect: None,
            constraints,
        }
    }

    pub fn with_host_effect(mut self, effect: HostEffect) -> Self {
        self.host_effect = Some(effect);
        self
    }

    pub fn with_server_group_effect(mut self, effect: ServerGroupEffect) -> Self {
        self.server_group_effect = Some(effect);
        self
    }

    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    pub fn host_effect(&self) -> Option<&HostEffect> {
        self.host_effect.as_ref()
    }

    pub fn server_group_effect(&self) -> Option<&ServerGroupEffect> {
        self.server_group_effect.as_ref()
    }

    pub fn constraints(&self) -> &[Arc<AccessConstraintDefinition>] {
        &self.constraints
    }
}

/// A single attribute of a management resource.
#[derive(Debug, Clone)]
pub struct TargetAttribute {
    resource: TargetResource,
    attribute: String,
    attribute_constraints: Vec<Arc<AccessConstraintDefinition>>,
}

impl TargetAttribute {
    pub fn new(
        resource: TargetResource,
        attribute: impl Into<String>,
        attribute_constraints: Vec<Arc<AccessConstraintDefinition>>,
    ) -> Self {
        Self {
            resource,
            attribute: attribute.into(),
            attribute_constraints,
        }
    }

    pub fn resource(&self) -> &TargetResource {
        &self.resource
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn attribute_constraints(&self) -> &[Arc<AccessConstraintDefinition>] {
        &self.attribute_constraints
    }
}

/// Impact class of a JMX operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JmxImpact {
    ReadOnly,
    Write,
    Classloading,
}

/// A JMX method invocation.
#[derive(Debug, Clone)]
pub struct JmxTarget {
    method: String,
    object_name: String,
    non_facade_sensitive: bool,
    host_effect: Option<HostEffect>,
    server_group_effect: Option<ServerGroupEffect>,
}

impl JmxTarget {
    /// `non_facade_sensitive` marks calls to MBeans outside the management
    /// facade that are configured as sensitive.
    pub fn new(
        method: impl Into<String>,
        object_name: impl Into<String>,
        non_facade_sensitive: bool,
    ) -> Self {
        Self {
            method: method.into(),
            object_name: object_name.into(),
            non_facade_sensitive,
            host_effect: None,
            server_group_effect: None,
        }
    }

    pub fn with_host_effect(mut self, effect: HostEffect) -> Self {
        self.host_effect = Some(effect);
        self
    }

    pub fn with_server_group_effect(mut self, effect: ServerGroupEffect) -> Self {
        self.server_group_effect = Some(effect);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn is_non_facade_sensitive(&self) -> bool {
        self.non_facade_sensitive
    }
}

#[derive(Debug, Clone)]
pub enum Target {
    Resource(TargetResource),
    Attribute(TargetAttribute),
    Jmx(JmxTarget),
}

impl Target {
    pub fn address(&self) -> Option<&PathAddress> {
        match self {
            Self::Resource(r) => Some(r.address()),
            Self::Attribute(a) => Some(a.resource().address()),
            Self::Jmx(_) => None,
        }
    }

    /// Every constraint that may bear on the action: resource constraints
    /// followed by attribute constraints.
    pub fn constraints(&self) -> impl Iterator<Item = &Arc<AccessConstraintDefinition>> {
        let (resource, attribute): (&[_], &[_]) = match self {
            Self::Resource(r) => (r.constraints(), &[]),
            Self::Attribute(a) => (a.resource().constraints(), a.attribute_constraints()),
            Self::Jmx(_) => (&[], &[]),
        };
        resource.iter().chain(attribute.iter())
    }

    pub fn host_effect(&self) -> Option<&HostEffect> {
        match self {
            Self::Resource(r) => r.host_effect(),
            Self::Attribute(a) => a.resource().host_effect(),
            Self::Jmx(j) => j.host_effect.as_ref(),
        }
    }

    pub fn server_group_effect(&self) -> Option<&ServerGroupEffect> {
        match self {
            Self::Resource(r) => r.server_group_effect(),
            Self::Attribute(a) => a.resource().server_group_effect(),
            Self::Jmx(j) => j.server_group_effect.as_ref(),
        }
    }

    pub fn as_jmx(&self) -> Option<&JmxTarget> {
        match self {
            Self::Jmx(j) => Some(j),
            _ => None,
        }
    }
}

impl From<TargetResource> for Target {
    fn from(resource: TargetResource) -> Self {
        Self::Resource(resource)
    }
}

impl From<TargetAttribute> for Target {
    fn from(attribute: TargetAttribute) -> Self {
        Self::Attribute(attribute)
    }
}

impl From<JmxTarget> for Target {
    fn from(jmx: JmxTarget) -> Self {
        Self::Jmx(jmx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraint::{AccessConstraintDefinition, ConstraintKind, ConstraintOwner};

    fn definition(name: &str) -> Arc<AccessConstraintDefinition> {
        Arc::new(AccessConstraintDefinition::new(
            ConstraintKind::Sensitivity,
            ConstraintOwner::Core,
            name,
        ))
    }

    #[test]
    fn test_attribute_target_chains_resource_and_attribute_constraints() {
        let resource = TargetResource::new(
            "/subsystem=datasources/data-source=main".parse().unwrap(),
            vec![definition("datasource")],
        );
        let target: Target =
            TargetAttribute::new(resource, "password", vec![definition("credential")]).into();

        let names: Vec<&str> = target.constraints().map(|c| c.name()).collect();
        assert_eq!(names, vec!["datasource", "credential"]);
    }

    #[test]
    fn test_server_host_effect() {
        let address: PathAddress = "/host=a/server=s1".parse().unwrap();
        let effect = HostEffect::server(address.clone(), "a");
        assert!(!effect.is_global());
        assert!(effect.is_server_effect());
        assert!(effect.affected_hosts().contains("a"));
        assert_eq!(effect.resource_address(), &address);
    }

    #[test]
    fn test_jmx_target_has_no_constraints_or_address() {
        let target: Target = JmxTarget::new("setLevel", "java.util.logging:type=Logging", true).into();
        assert!(target.address().is_none());
        assert_eq!(target.constraints().count(), 0);
        assert!(target.as_jmx().is_some_and(JmxTarget::is_non_facade_sensitive));
    }
}
