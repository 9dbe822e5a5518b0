// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Requirement Builder
//!
//! A small stack machine for declaring requirement trees in the order a
//! command definition reads:
//!
//! ```text
//! RequirementBuilder::new()
//!     .any()?
//!         .standalone()?.operation(deployments, "add")?.parent()?
//!         .domain()?.all()?
//!             .operation(deployments, "add")?
//!             .server_group(deployments, "add")?
//!     .build()?
//! ```
//!
//! A session has exactly one root shape. Misuse (a second root, a leaf
//! outside any composite, popping past the root) is a programming error in
//! the command wiring and is reported immediately as a [`BuilderError`].

use std::sync::Arc;

use mgmt_access_core::domain::address::PathAddress;
use mgmt_access_core::domain::environment::ControllerMode;
use thiserror::Error;

use crate::domain::requirement::Requirement;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Builder session already has a root")]
    RootAlreadyChosen,

    #[error("No open composite to add to; the root is already closed")]
    NoOpenComposite,

    #[error("parent() called with no open composite")]
    NoParent,

    #[error("Composite '{0}' closed without children")]
    EmptyComposite(&'static str),

    #[error("No root chosen; start with all(), any(), standalone() or domain()")]
    NotStarted,
}

#[derive(Debug)]
enum Shape {
    All,
    Any,
    Mode(ControllerMode),
}

#[derive(Debug)]
struct Frame {
    shape: Shape,
    children: Vec<Arc<Requirement>>,
}

impl Frame {
    fn close(self) -> Result<Arc<Requirement>, BuilderError> {
        let node = match self.shape {
            Shape::All if self.children.is_empty() => return Err(BuilderError::EmptyComposite("all")),
            Shape::Any if self.children.is_empty() => return Err(BuilderError::EmptyComposite("any")),
            Shape::All => Requirement::all_of(self.children),
            Shape::Any => Requirement::any_of(self.children),
            Shape::Mode(mode) => {
                let mut children = self.children;
                let inner = match children.len() {
                    0 => Arc::new(Requirement::always()),
                    1 => children.remove(0),
                    _ => Arc::new(Requirement::all_of(children)),
                };
                Requirement::controller_mode(mode, inner)
            }
        };
        Ok(Arc::new(node))
    }
}

#[derive(Debug, Default)]
pub struct RequirementBuilder {
    stack: Vec<Frame>,
    root: Option<Arc<Requirement>>,
}

impl RequirementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an `AllOf` composite: as the root, or nested in the open one.
    pub fn all(self) -> Result<Self, BuilderError> {
        self.open(Shape::All)
    }

    pub fn any(self) -> Result<Self, BuilderError> {
        self.open(Shape::Any)
    }

    /// Open a gate that holds only on standalone connections. Children added
    /// to the gate must all hold.
    pub fn standalone(self) -> Result<Self, BuilderError> {
        self.open(Shape::Mode(ControllerMode::Standalone))
    }

    pub fn domain(self) -> Result<Self, BuilderError> {
        self.open(Shape::Mode(ControllerMode::Domain))
    }

    /// Close the innermost open composite and return to its parent.
    pub fn parent(mut self) -> Result<Self, BuilderError> {
        let frame = self.stack.pop().ok_or(BuilderError::NoParent)?;
        let node = frame.close()?;
        self.attach(node)?;
        Ok(self)
    }

    pub fn always(self) -> Result<Self, BuilderError> {
        self.leaf(Requirement::always())
    }

    pub fn operation(self, address: PathAddress, operation: impl Into<String>) -> Result<Self, BuilderError> {
        self.leaf(Requirement::operation(address, operation))
    }

    pub fn per_node(
        self,
        parent: PathAddress,
        node_type: impl Into<String>,
        address: PathAddress,
        operation: impl Into<String>,
    ) -> Result<Self, BuilderError> {
        self.leaf(Requirement::per_node(parent, node_type, address, operation))
    }

    /// `operation` at `address` is executable in at least one server group.
    pub fn server_group(self, address: PathAddress, operation: impl Into<String>) -> Result<Self, BuilderError> {
        self.per_node(PathAddress::root(), "server-group", address, operation)
    }

    /// `operation` at `address` is executable on at least one server of some
    /// host.
    pub fn host_server(self, address: PathAddress, operation: impl Into<String>) -> Result<Self, BuilderError> {
        self.leaf(Requirement::host_server(address, operation))
    }

    /// Add an already-built tree as a child.
    pub fn requirement(self, requirement: Arc<Requirement>) -> Result<Self, BuilderError> {
        self.push_child(requirement)
    }

    /// Close every open composite and return the root.
    pub fn build(mut self) -> Result<Arc<Requirement>, BuilderError> {
        while let Some(frame) = self.stack.pop() {
            let node = frame.close()?;
            self.attach(node)?;
        }
        self.root.ok_or(BuilderError::NotStarted)
    }

    fn open(mut self, shape: Shape) -> Result<Self, BuilderError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(BuilderError::RootAlreadyChosen);
        }
        self.stack.push(Frame {
            shape,
            children: Vec::new(),
        });
        Ok(self)
    }

    fn leaf(self, requirement: Requirement) -> Result<Self, BuilderError> {
        self.push_child(Arc::new(requirement))
    }

    fn push_child(mut self, requirement: Arc<Requirement>) -> Result<Self, BuilderError> {
        match self.stack.last_mut() {
            Some(frame) => {
                frame.children.push(requirement);
                Ok(self)
            }
            None if self.root.is_some() => Err(BuilderError::NoOpenComposite),
            None => Err(BuilderError::NotStarted),
        }
    }

    /// Attach a closed node to the enclosing frame, or make it the root.
    fn attach(&mut self, node: Arc<Requirement>) -> Result<(), BuilderError> {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None if self.root.is_some() => return Err(BuilderError::RootAlreadyChosen),
            None => self.root = Some(node),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployments() -> PathAddress {
        "/deployment=*".parse().unwrap()
    }

    #[test]
    fn test_builds_nested_tree() {
        let tree = RequirementBuilder::new()
            .any()
            .unwrap()
            .standalone()
            .unwrap()
            .operation(deployments(), "add")
            .unwrap()
            .parent()
            .unwrap()
            .domain()
            .unwrap()
            .all()
            .unwrap()
            .operation(deployments(), "add")
            .unwrap()
            .server_group(deployments(), "add")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            tree.to_string(),
            "any(standalone(op(/deployment=*:add)), \
             domain(all(op(/deployment=*:add), any-server-group(/deployment=*:add))))"
        );
    }

    #[test]
    fn test_mode_gate_with_several_children_requires_all() {
        let tree = RequirementBuilder::new()
            .domain()
            .unwrap()
            .always()
            .unwrap()
            .host_server(PathAddress::root(), "start")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(tree.to_string(), "domain(all(always, any-host-server(/:start)))");

        let empty_gate = RequirementBuilder::new().standalone().unwrap().build().unwrap();
        assert_eq!(empty_gate.to_string(), "standalone(always)");
    }

    #[test]
    fn test_second_root_is_rejected() {
        let err = RequirementBuilder::new()
            .all()
            .unwrap()
            .always()
            .unwrap()
            .parent()
            .unwrap()
            .any()
            .unwrap_err();
        assert_eq!(err, BuilderError::RootAlreadyChosen);
    }

    #[test]
    fn test_leaf_after_root_closed_is_rejected() {
        let err = RequirementBuilder::new()
            .all()
            .unwrap()
            .always()
            .unwrap()
            .parent()
            .unwrap()
            .always()
            .unwrap_err();
        assert_eq!(err, BuilderError::NoOpenComposite);
    }

    #[test]
    fn test_misuse_before_start() {
        assert_eq!(RequirementBuilder::new().always().unwrap_err(), BuilderError::NotStarted);
        assert_eq!(RequirementBuilder::new().parent().unwrap_err(), BuilderError::NoParent);
        assert_eq!(RequirementBuilder::new().build().unwrap_err(), BuilderError::NotStarted);
    }

    #[test]
    fn test_empty_composite_is_rejected() {
        let err = RequirementBuilder::new().all().unwrap().build().unwrap_err();
        assert_eq!(err, BuilderError::EmptyComposite("all"));
    }
}
