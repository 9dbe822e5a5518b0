// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Builds the runtime access-control model from an [`AccessControlConfig`].
//!
//! Every configured constraint is registered in the given
//! [`ConstraintRegistry`]; the resource model holds the canonical instances.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::application::access_service::AccessCheckService;
use crate::application::authorizer::RoleBasedAuthorizer;
use crate::domain::address::PathAddress;
use crate::domain::caller::Caller;
use crate::domain::config::{AccessControlConfig, ConfigError};
use crate::domain::constraint::{AccessConstraintDefinition, ConstraintRule, ConstraintRules};
use crate::domain::environment::{ControllerMode, Environment, ProcessType};
use crate::domain::resource_model::{ResourceEntry, ResourceModel};
use crate::domain::role::RolePermissions;
use crate::infrastructure::constraint_registry::ConstraintRegistry;

pub struct AccessControlModel {
    authorizer: Arc<RoleBasedAuthorizer>,
    resources: Arc<ResourceModel>,
    caller: Caller,
    environment: Environment,
}

impl AccessControlModel {
    pub fn from_config(
        config: &AccessControlConfig,
        registry: &ConstraintRegistry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let spec = &config.spec;

        let mut roles = RolePermissions::new();
        for (name, effects) in &spec.roles {
            roles.insert(name, effects.clone());
        }

        let mut rules = ConstraintRules::new();
        let mut by_name: HashMap<&str, Arc<AccessConstraintDefinition>> = HashMap::new();
        for constraint in &spec.constraints {
            let mut definition =
                AccessConstraintDefinition::new(constraint.kind, constraint.owner.clone(), &constraint.name);
            if let Some(description) = &constraint.description {
                definition = definition.with_description(description);
            }
            let canonical = registry.register(definition);
            rules.insert(
                &canonical,
                ConstraintRule::new(constraint.effects.clone(), &constraint.permitted_roles),
            );
            by_name.insert(constraint.name.as_str(), canonical);
        }

        let lookup = |resource: &str, names: &[String]| {
            names
                .iter()
                .map(|name| {
                    by_name
                        .get(name.as_str())
                        .cloned()
                        .ok_or_else(|| ConfigError::UnknownConstraint {
                            resource: resource.to_string(),
                            constraint: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let mut entries = Vec::with_capacity(spec.resources.len());
        for resource in &spec.resources {
            let pattern: PathAddress =
                resource
                    .address
                    .parse()
                    .map_err(|source| ConfigError::InvalidAddress {
                        address: resource.address.clone(),
                        source,
                    })?;
            let mut entry = ResourceEntry::new(pattern);
            entry.constraints = lookup(&resource.address, &resource.constraints)?;
            for (attribute, names) in &resource.attributes {
                entry
                    .attributes
                    .insert(attribute.clone(), lookup(&resource.address, names)?);
            }
            entry.operations = resource.operations.clone();
            entries.push(entry);
        }

        let environment = match spec.topology.mode {
            ControllerMode::Standalone => Environment::standalone(),
            ControllerMode::Domain => Environment {
                process_type: ProcessType::DomainController,
                local_host: spec.topology.hosts.first().map(|h| h.name.clone()),
            },
        };

        info!(
            policy = %spec.combination_policy,
            constraints = spec.constraints.len(),
            resources = entries.len(),
            mode = %spec.topology.mode,
            "Access control model loaded"
        );

        Ok(Self {
            authorizer: Arc::new(RoleBasedAuthorizer::new(spec.combination_policy, roles, rules)),
            resources: Arc::new(ResourceModel::new(spec.topology.clone(), entries)),
            caller: spec.caller.to_caller(),
            environment,
        })
    }

    pub fn access_service(&self) -> AccessCheckService {
        AccessCheckService::new(self.authorizer.clone(), self.resources.clone())
    }

    pub fn authorizer(&self) -> &RoleBasedAuthorizer {
        &self.authorizer
    }

    pub fn resources(&self) -> &Arc<ResourceModel> {
        &self.resources
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}
