// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Command Catalog
//!
//! Console commands and their options, each gated by a requirement tree.
//! The console lists only what the connected identity could actually run,
//! and asks a command's quantifier for its allowed targets when the command
//! is invoked.

use std::sync::Arc;

use mgmt_access_core::domain::address::{PathAddress, PathElement};
use tracing::debug;

use crate::application::builder::{BuilderError, RequirementBuilder};
use crate::application::registry::RequirementRegistry;
use crate::domain::connection::Connection;
use crate::domain::requirement::{Requirement, RequirementKind};

#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub requirement: Arc<Requirement>,
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub requirement: Arc<Requirement>,
    pub options: Vec<OptionSpec>,
}

impl CommandSpec {
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// Instances a command may act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTargets {
    /// Allowed instances of one node type, e.g. server groups.
    Instances { node_type: String, names: Vec<String> },
    /// Allowed servers per host, for hosts with at least one.
    Servers(Vec<(String, Vec<String>)>),
}

#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    commands: Vec<CommandSpec>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in console commands. Every tree is registered so a
    /// disconnect resets them together.
    pub fn standard(registry: &RequirementRegistry) -> Result<Self, BuilderError> {
        let root = PathAddress::root();
        let deployments = PathAddress::root().append(PathElement::wildcard("deployment"));
        let mut catalog = Self::new();

        catalog.add(
            registry,
            "read-resource",
            "Read a management resource",
            RequirementBuilder::new()
                .all()?
                .operation(root.clone(), "read-resource")?
                .build()?,
            vec![],
        );
        catalog.add(
            registry,
            "ls",
            "List the children of a resource",
            RequirementBuilder::new()
                .all()?
                .operation(root.clone(), "read-children-names")?
                .build()?,
            vec![],
        );
        catalog.add(
            registry,
            "help",
            "Show available commands",
            RequirementBuilder::new().all()?.always()?.build()?,
            vec![],
        );

        catalog.add(
            registry,
            "deploy",
            "Deploy an application",
            RequirementBuilder::new()
                .any()?
                .standalone()?
                .operation(deployments.clone(), "add")?
                .parent()?
                .domain()?
                .server_group(deployments.clone(), "add")?
                .build()?,
            vec![
                (
                    "--server-groups",
                    "Deploy to the named server groups",
                    RequirementBuilder::new()
                        .domain()?
                        .server_group(deployments.clone(), "add")?
                        .build()?,
                ),
                (
                    "--all-server-groups",
                    "Deploy to every server group",
                    RequirementBuilder::new()
                        .domain()?
                        .operation(deployments.clone(), "add")?
                        .build()?,
                ),
                (
                    "--force",
                    "Replace an existing deployment",
                    RequirementBuilder::new()
                        .all()?
                        .operation(deployments.clone(), "add")?
                        .operation(deployments.clone(), "remove")?
                        .build()?,
                ),
            ],
        );
        catalog.add(
            registry,
            "undeploy",
            "Remove a deployment",
            RequirementBuilder::new()
                .all()?
                .operation(deployments.clone(), "remove")?
                .build()?,
            vec![(
                "--server-groups",
                "Undeploy from the named server groups",
                RequirementBuilder::new()
                    .domain()?
                    .server_group(deployments.clone(), "remove")?
                    .build()?,
            )],
        );

        catalog.add(
            registry,
            "reload",
            "Reload a controller",
            RequirementBuilder::new()
                .any()?
                .standalone()?
                .operation(root.clone(), "reload")?
                .parent()?
                .domain()?
                .per_node(root.clone(), "host", root.clone(), "reload")?
                .build()?,
            vec![],
        );
        for (name, operation, description) in [
            ("start-server", "start", "Start a server"),
            ("stop-server", "stop", "Stop a server"),
        ] {
            catalog.add(
                registry,
                name,
                description,
                RequirementBuilder::new()
                    .domain()?
                    .host_server(root.clone(), operation)?
                    .build()?,
                vec![],
            );
        }

        debug!(commands = catalog.commands.len(), "Command catalog built");
        Ok(catalog)
    }

    /// Add a command; its tree and option trees are registered in `registry`.
    pub fn add(
        &mut self,
        registry: &RequirementRegistry,
        name: &str,
        description: &str,
        requirement: Arc<Requirement>,
        options: Vec<(&str, &str, Arc<Requirement>)>,
    ) {
        let options = options
            .into_iter()
            .map(|(name, description, requirement)| OptionSpec {
                name: name.to_string(),
                description: description.to_string(),
                requirement: registry.register(requirement),
            })
            .collect();
        self.commands.push(CommandSpec {
            name: name.to_string(),
            description: description.to_string(),
            requirement: registry.register(requirement),
            options,
        });
    }

    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Commands whose requirement holds on `conn`, in catalog order.
    pub async fn available_commands(&self, conn: &dyn Connection) -> Vec<&CommandSpec> {
        let mut available = Vec::new();
        for command in &self.commands {
            if command.requirement.is_satisfied(conn).await {
                available.push(command);
            }
        }
        available
    }

    /// Options of `command` whose requirement holds on `conn`. `None` when
    /// the command is unknown or not itself available.
    pub async fn available_options(&self, conn: &dyn Connection, command: &str) -> Option<Vec<&OptionSpec>> {
        let command = self.command(command)?;
        if !command.requirement.is_satisfied(conn).await {
            return None;
        }
        let mut available = Vec::new();
        for option in &command.options {
            if option.requirement.is_satisfied(conn).await {
                available.push(option);
            }
        }
        Some(available)
    }

    /// Allowed targets of the first quantifier in `command`'s tree. `None`
    /// when the command is unknown or has no quantifier.
    pub async fn targets(&self, conn: &dyn Connection, command: &str) -> Option<CommandTargets> {
        let quantifier = self.command(command)?.requirement.find_quantifier()?;
        match quantifier.kind() {
            RequirementKind::PerNode { node_type, .. } => Some(CommandTargets::Instances {
                node_type: node_type.clone(),
                names: quantifier.allowed(conn).await?,
            }),
            RequirementKind::HostServer { .. } => {
                let hosts = quantifier.allowed_hosts(conn).await?;
                let mut servers = Vec::with_capacity(hosts.len());
                for host in hosts {
                    let allowed = quantifier.allowed_servers(conn, &host).await?;
                    servers.push((host, allowed));
                }
                Some(CommandTargets::Servers(servers))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_registers_every_tree() {
        let registry = RequirementRegistry::new();
        let catalog = CommandCatalog::standard(&registry).unwrap();
        let option_count: usize = catalog.commands().iter().map(|c| c.options.len()).sum();
        assert_eq!(registry.len(), catalog.commands().len() + option_count);
    }

    #[test]
    fn test_deploy_tree_shape() {
        let registry = RequirementRegistry::new();
        let catalog = CommandCatalog::standard(&registry).unwrap();
        let deploy = catalog.command("deploy").unwrap();
        assert_eq!(
            deploy.requirement.to_string(),
            "any(standalone(op(/deployment=*:add)), domain(any-server-group(/deployment=*:add)))"
        );
        assert!(deploy.option("--force").is_some());
        assert!(deploy.option("--nope").is_none());
    }
}
