// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! A console session: the loaded access-control model, the identity the
//! console acts as, and its connection to the in-process controller.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use mgmt_access_core::application::access_service::AccessCheckService;
use mgmt_access_core::application::model::AccessControlModel;
use mgmt_access_core::domain::caller::{Caller, RoleMapping};
use mgmt_access_core::domain::config::AccessControlConfig;
use mgmt_access_core::domain::environment::Environment;
use mgmt_access_core::infrastructure::constraint_registry::ConstraintRegistry;
use mgmt_access_requirements::{
    CommandCatalog, Connection, LocalController, ManagedConnection, RequirementRegistry,
};
use tracing::debug;

/// How to open a session, from global command-line flags.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub config: Option<PathBuf>,
    /// Act as this caller instead of the configured one.
    pub caller: Option<String>,
    /// Replace the caller's role mappings with these global roles.
    pub roles: Vec<String>,
    /// Hosts whose queries fail, as if the network to them were down.
    pub unreachable: Vec<String>,
}

pub struct Session {
    config: AccessControlConfig,
    model: AccessControlModel,
    controller: Arc<LocalController>,
    connection: ManagedConnection,
    catalog: CommandCatalog,
}

impl Session {
    pub fn open(options: &SessionOptions) -> Result<Self> {
        let config = AccessControlConfig::load_or_default(options.config.clone())
            .context("Failed to load configuration")?;
        Self::from_config(config, options)
    }

    pub fn from_config(config: AccessControlConfig, options: &SessionOptions) -> Result<Self> {
        let model = AccessControlModel::from_config(&config, ConstraintRegistry::global())
            .context("Invalid access control configuration")?;

        let caller = resolve_caller(&model, options)?;
        let controller = Arc::new(LocalController::new(
            model.access_service(),
            caller,
            model.environment().clone(),
        ));
        controller.set_unreachable(options.unreachable.iter().cloned());

        let registry = Arc::new(RequirementRegistry::new());
        let catalog = CommandCatalog::standard(&registry).context("Failed to build command catalog")?;
        let connection = controller.connect();
        connection.subscribe(registry);

        debug!(
            caller = controller.caller().name(),
            mode = %controller.mode(),
            "Session opened"
        );
        Ok(Self {
            config,
            model,
            controller,
            connection,
            catalog,
        })
    }

    pub fn config(&self) -> &AccessControlConfig {
        &self.config
    }

    pub fn caller(&self) -> &Caller {
        self.controller.caller()
    }

    pub fn environment(&self) -> &Environment {
        self.model.environment()
    }

    pub fn service(&self) -> AccessCheckService {
        self.model.access_service()
    }

    pub fn connection(&self) -> &ManagedConnection {
        &self.connection
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }
}

fn resolve_caller(model: &AccessControlModel, options: &SessionOptions) -> Result<Caller> {
    let name = options
        .caller
        .clone()
        .unwrap_or_else(|| model.caller().name().to_string());
    if options.roles.is_empty() {
        let configured = model.caller();
        return Ok(configured
            .roles()
            .iter()
            .cloned()
            .fold(Caller::new(name), Caller::with_mapping));
    }

    let known = model.authorizer().roles();
    let mut caller = Caller::new(name);
    for role in &options.roles {
        if !known.contains(role) {
            bail!(
                "Unknown role '{}'; configured roles: {}",
                role,
                known.names().collect::<Vec<_>>().join(", ")
            );
        }
        caller = caller.with_mapping(RoleMapping::global(role.as_str()));
    }
    Ok(caller)
}
