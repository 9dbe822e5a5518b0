// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Requirement Trees
//!
//! A [`Requirement`] is an immutable boolean expression gating a client-side
//! capability (a console command or one of its options). Trees are built
//! once, shared through `Arc` by every connection, and never hold
//! evaluation state: memoized results and scan progress live in each
//! connection's [`super::state::EvaluationStore`], keyed by [`RequirementId`].
//!
//! | Variant | Satisfied when |
//! |---------|----------------|
//! | `Always` | always |
//! | `Operation` | the operation is executable at the address |
//! | `ControllerMode` | the connection is in the mode and the inner requirement holds |
//! | `AllOf` | every child holds, evaluated in order, stopping at the first false |
//! | `AnyOf` | some child holds, evaluated in order, stopping at the first true |
//! | `PerNode` | the operation is executable under at least one instance of a node type |
//! | `HostServer` | the operation is executable on at least one server of some host |

use std::fmt;
use std::sync::Arc;

use mgmt_access_core::domain::address::PathAddress;
use mgmt_access_core::domain::environment::ControllerMode;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequirementId(pub Uuid);

impl RequirementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequirementId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum RequirementKind {
    Always,
    Operation {
        address: PathAddress,
        operation: String,
    },
    ControllerMode {
        mode: ControllerMode,
        inner: Arc<Requirement>,
    },
    AllOf(Vec<Arc<Requirement>>),
    AnyOf(Vec<Arc<Requirement>>),
    /// Some `node_type` child of `parent` permits `operation` at `address`
    /// relative to it.
    PerNode {
        parent: PathAddress,
        node_type: String,
        address: PathAddress,
        operation: String,
    },
    /// Some server of some host permits `operation` at `address` relative to
    /// `/host=H/server=S`.
    HostServer {
        address: PathAddress,
        operation: String,
    },
}

#[derive(Debug)]
pub struct Requirement {
    id: RequirementId,
    kind: RequirementKind,
}

impl Requirement {
    pub fn new(kind: RequirementKind) -> Self {
        Self {
            id: RequirementId::new(),
            kind,
        }
    }

    pub fn always() -> Self {
        Self::new(RequirementKind::Always)
    }

    pub fn operation(address: PathAddress, operation: impl Into<String>) -> Self {
        Self::new(RequirementKind::Operation {
            address,
            operation: operation.into(),
        })
    }

    pub fn controller_mode(mode: ControllerMode, inner: Arc<Requirement>) -> Self {
        Self::new(RequirementKind::ControllerMode { mode, inner })
    }

    pub fn all_of(children: Vec<Arc<Requirement>>) -> Self {
        Self::new(RequirementKind::AllOf(children))
    }

    pub fn any_of(children: Vec<Arc<Requirement>>) -> Self {
        Self::new(RequirementKind::AnyOf(children))
    }

    pub fn per_node(
        parent: PathAddress,
        node_type: impl Into<String>,
        address: PathAddress,
        operation: impl Into<String>,
    ) -> Self {
        Self::new(RequirementKind::PerNode {
            parent,
            node_type: node_type.into(),
            address,
            operation: operation.into(),
        })
    }

    pub fn host_server(address: PathAddress, operation: impl Into<String>) -> Self {
        Self::new(RequirementKind::HostServer {
            address,
            operation: operation.into(),
        })
    }

    pub fn id(&self) -> RequirementId {
        self.id
    }

    pub fn kind(&self) -> &RequirementKind {
        &self.kind
    }

    pub fn children(&self) -> &[Arc<Requirement>] {
        match &self.kind {
            RequirementKind::ControllerMode { inner, .. } => std::slice::from_ref(inner),
            RequirementKind::AllOf(children) | RequirementKind::AnyOf(children) => children,
            _ => &[],
        }
    }

    pub fn is_quantifier(&self) -> bool {
        matches!(
            self.kind,
            RequirementKind::PerNode { .. } | RequirementKind::HostServer { .. }
        )
    }

    /// The first quantifier in this tree, depth first.
    pub fn find_quantifier(&self) -> Option<&Requirement> {
        if self.is_quantifier() {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_quantifier())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, children: &[Arc<Requirement>]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", child)?;
    }
    f.write_str(")")
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RequirementKind::Always => f.write_str("always"),
            RequirementKind::Operation { address, operation } => {
                write!(f, "op({}:{})", address, operation)
            }
            RequirementKind::ControllerMode { mode, inner } => write!(f, "{}({})", mode, inner),
            RequirementKind::AllOf(children) => write_list(f, "all", children),
            RequirementKind::AnyOf(children) => write_list(f, "any", children),
            RequirementKind::PerNode {
                parent,
                node_type,
                address,
                operation,
            } => {
                if parent.is_empty() {
                    write!(f, "any-{}({}:{})", node_type, address, operation)
                } else {
                    write!(f, "any-{}@{}({}:{})", node_type, parent, address, operation)
                }
            }
            RequirementKind::HostServer { address, operation } => {
                write!(f, "any-host-server({}:{})", address, operation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> PathAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_renders_tree() {
        let tree = Requirement::all_of(vec![
            Arc::new(Requirement::operation(addr("/deployment=*"), "add")),
            Arc::new(Requirement::controller_mode(
                ControllerMode::Domain,
                Arc::new(Requirement::host_server(PathAddress::root(), "start")),
            )),
        ]);
        assert_eq!(
            tree.to_string(),
            "all(op(/deployment=*:add), domain(any-host-server(/:start)))"
        );
    }

    #[test]
    fn test_find_quantifier_is_depth_first() {
        let per_node = Arc::new(Requirement::per_node(
            PathAddress::root(),
            "server-group",
            PathAddress::root(),
            "start-servers",
        ));
        let tree = Requirement::any_of(vec![
            Arc::new(Requirement::always()),
            Arc::new(Requirement::controller_mode(ControllerMode::Domain, per_node.clone())),
        ]);
        assert_eq!(tree.find_quantifier().map(Requirement::id), Some(per_node.id()));
        assert!(Requirement::always().find_quantifier().is_none());
    }

    #[test]
    fn test_every_node_has_a_distinct_id() {
        let a = Requirement::always();
        let b = Requirement::always();
        assert_ne!(a.id(), b.id());
    }
}
