// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resource Model
//!
//! The registry of management resources the decision point knows about:
//! address patterns with their constraints, attributes, and operations, plus
//! the domain topology that gives `host`, `server` and `server-group`
//! elements their meaning.
//!
//! [`ResourceModel::target_for`] builds the [`TargetResource`] for a concrete
//! address, including the [`HostEffect`] and [`ServerGroupEffect`] that
//! scoped roles are evaluated against. Wildcard values count as global.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::action::{OperationEntry, OperationFlags};
use super::address::PathAddress;
use super::constraint::AccessConstraintDefinition;
use super::environment::ControllerMode;
use super::target::{HostEffect, ServerGroupEffect, TargetAttribute, TargetResource};
use super::topology::Topology;

/// Operations every resource supports.
const GLOBAL_OPERATIONS: &[(&str, OperationFlags)] = &[
    ("read-resource", OperationFlags::READ_ONLY),
    ("read-attribute", OperationFlags::READ_ONLY),
    ("read-children-names", OperationFlags::READ_ONLY),
    ("read-resource-description", OperationFlags::READ_ONLY),
    ("write-attribute", OperationFlags::READ_WRITE),
    ("undefine-attribute", OperationFlags::READ_WRITE),
];

/// One registered resource pattern.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub pattern: PathAddress,
    pub constraints: Vec<Arc<AccessConstraintDefinition>>,
    pub attributes: BTreeMap<String, Vec<Arc<AccessConstraintDefinition>>>,
    pub operations: Vec<OperationEntry>,
}

impl ResourceEntry {
    pub fn new(pattern: PathAddress) -> Self {
        Self {
            pattern,
            constraints: Vec::new(),
            attributes: BTreeMap::new(),
            operations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceModel {
    topology: Topology,
    entries: Vec<ResourceEntry>,
}

impl ResourceModel {
    pub fn new(topology: Topology, entries: Vec<ResourceEntry>) -> Self {
        Self { topology, entries }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn mode(&self) -> ControllerMode {
        self.topology.mode
    }

    fn matching(&self, address: &PathAddress) -> impl Iterator<Item = &ResourceEntry> {
        let address = address.clone();
        self.entries
            .iter()
            .filter(move |entry| entry.pattern.matches(&address))
    }

    /// Whether `address` names an existing resource.
    pub fn contains(&self, address: &PathAddress) -> bool {
        if address.is_empty() {
            return true;
        }
        self.instances_exist(address) && self.matching(address).next().is_some()
    }

    fn instances_exist(&self, address: &PathAddress) -> bool {
        let mut host = None;
        for element in address.elements() {
            match element.key.as_str() {
                "host" => {
                    if self.topology.mode == ControllerMode::Standalone
                        || self.topology.host(&element.value).is_none()
                    {
                        return false;
                    }
                    host = Some(element.value.as_str());
                }
                "server" | "server-config" => {
                    if let Some(host) = host {
                        if self.topology.group_of(host, &element.value).is_none() {
                            return false;
                        }
                    }
                }
                "server-group" => {
                    if !self.topology.has_server_group(&element.value) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }

    pub fn target_for(&self, address: &PathAddress) -> TargetResource {
        let constraints = self
            .matching(address)
            .flat_map(|entry| entry.constraints.iter().cloned())
            .collect();
        let target = TargetResource::new(address.clone(), constraints);
        if self.topology.mode == ControllerMode::Standalone {
            return target;
        }
        target
            .with_host_effect(self.host_effect(address))
            .with_server_group_effect(self.server_group_effect(address))
    }

    pub fn target_for_attribute(&self, address: &PathAddress, attribute: &str) -> TargetAttribute {
        let attribute_constraints = self
            .matching(address)
            .filter_map(|entry| entry.attributes.get(attribute))
            .flat_map(|constraints| constraints.iter().cloned())
            .collect();
        TargetAttribute::new(self.target_for(address), attribute, attribute_constraints)
    }

    /// The operation `name` as registered at `address`, falling back to the
    /// operations every resource supports.
    pub fn operation(&self, address: &PathAddress, name: &str) -> Option<OperationEntry> {
        self.matching(address)
            .flat_map(|entry| entry.operations.iter())
            .find(|op| op.name == name)
            .cloned()
            .or_else(|| {
                GLOBAL_OPERATIONS
                    .iter()
                    .find(|(op, _)| *op == name)
                    .map(|(op, flags)| OperationEntry::new(*op, *flags))
            })
    }

    fn host_effect(&self, address: &PathAddress) -> HostEffect {
        let elements = address.elements();
        let Some(position) = elements.iter().position(|e| e.key == "host") else {
            return HostEffect::global(address.clone());
        };
        let host = &elements[position];
        if host.is_wildcard() {
            return HostEffect::global(address.clone());
        }
        match elements.get(position + 1) {
            Some(next)
                if (next.key == "server" || next.key == "server-config") && !next.is_wildcard() =>
            {
                HostEffect::server(address.clone(), host.value.clone())
            }
            _ => HostEffect::hosts(address.clone(), [host.value.clone()]),
        }
    }

    fn server_group_effect(&self, address: &PathAddress) -> ServerGroupEffect {
        if let Some(group) = address.value_of("server-group") {
            if group != crate::domain::address::WILDCARD {
                return ServerGroupEffect::groups(address.clone(), [group]);
            }
            return ServerGroupEffect::global(address.clone());
        }
        let host = address.value_of("host");
        let server = address
            .value_of("server")
            .or_else(|| address.value_of("server-config"));
        match host.zip(server).and_then(|(h, s)| self.topology.group_of(h, s)) {
            Some(group) => ServerGroupEffect::groups(address.clone(), [group]),
            None => ServerGroupEffect::global(address.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraint::{ConstraintKind, ConstraintOwner};
    use crate::domain::topology::{HostSpec, ServerSpec};

    fn addr(s: &str) -> PathAddress {
        s.parse().unwrap()
    }

    fn model() -> ResourceModel {
        let topology = Topology {
            mode: ControllerMode::Domain,
            hosts: vec![HostSpec {
                name: "a".into(),
                servers: vec![ServerSpec {
                    name: "s1".into(),
                    group: "main".into(),
                }],
            }],
            server_groups: vec!["main".into()],
        };
        let vault = Arc::new(AccessConstraintDefinition::new(
            ConstraintKind::Sensitivity,
            ConstraintOwner::Core,
            "vault",
        ));
        let mut server = ResourceEntry::new(addr("/host=*/server=*"));
        server.operations.push(OperationEntry::new("stop", OperationFlags::RUNTIME_ONLY));
        let mut secured = ResourceEntry::new(addr("/core-service=vault"));
        secured.constraints.push(vault);
        ResourceModel::new(
            topology,
            vec![
                ResourceEntry::new(addr("/host=*")),
                server,
                ResourceEntry::new(addr("/server-group=*")),
                secured,
            ],
        )
    }

    #[test]
    fn test_contains_checks_topology_instances() {
        let model = model();
        assert!(model.contains(&PathAddress::root()));
        assert!(model.contains(&addr("/host=a/server=s1")));
        assert!(!model.contains(&addr("/host=a/server=s9")));
        assert!(!model.contains(&addr("/host=b")));
        assert!(!model.contains(&addr("/subsystem=unknown")));
    }

    #[test]
    fn test_server_target_has_host_and_group_effects() {
        let target = model().target_for(&addr("/host=a/server=s1"));
        let host = target.host_effect().unwrap();
        assert!(host.is_server_effect());
        assert!(host.affected_hosts().contains("a"));
        let group = target.server_group_effect().unwrap();
        assert!(group.affected_groups().contains("main"));
    }

    #[test]
    fn test_non_topology_target_is_global() {
        let target = model().target_for(&addr("/core-service=vault"));
        assert!(target.host_effect().unwrap().is_global());
        assert!(target.server_group_effect().unwrap().is_global());
        assert_eq!(target.constraints().len(), 1);
    }

    #[test]
    fn test_operation_lookup_falls_back_to_global_operations() {
        let model = model();
        let stop = model.operation(&addr("/host=a/server=s1"), "stop").unwrap();
        assert_eq!(stop.flags, OperationFlags::RUNTIME_ONLY);
        assert!(model.operation(&addr("/host=a"), "stop").is_none());
        let read = model.operation(&addr("/host=a"), "read-resource").unwrap();
        assert!(read.flags.read_only);
    }
}
