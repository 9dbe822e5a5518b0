// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Access Control Configuration
//
// Kubernetes-style manifest (apiVersion/kind/metadata/spec) describing:
// - the constraint combination policy
// - role base permissions
// - constraint definitions and the roles they permit
// - the resource model (address patterns, constraints, operations)
// - the managed domain topology
// - the default caller used by the console

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use anyhow::Context;

use super::action::{OperationEntry, OperationFlags};
use super::address::{AddressParseError, PathAddress};
use super::caller::{Caller, RoleMapping};
use super::combination::CombinationPolicy;
use super::constraint::{ConstraintKind, ConstraintOwner};
use super::effect::{ActionEffect, EffectSet};
use super::environment::ControllerMode;
use super::role::StandardRole;
use super::topology::{HostSpec, ServerSpec, Topology};

pub const API_VERSION: &str = "mgmt-access/v1";
pub const KIND: &str = "AccessControlConfig";

pub const CONFIG_PATH_ENV: &str = "MGMT_ACCESS_CONFIG_PATH";
pub const COMBINATION_POLICY_ENV: &str = "MGMT_ACCESS_COMBINATION_POLICY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid apiVersion: '{0}'. Must be 'mgmt-access/v1'")]
    InvalidApiVersion(String),

    #[error("Invalid kind: '{0}'. Must be 'AccessControlConfig'")]
    InvalidKind(String),

    #[error("metadata.name cannot be empty")]
    EmptyName,

    #[error("Unknown role '{role}' referenced by {context}")]
    UnknownRole { context: String, role: String },

    #[error("Resource '{resource}' references unknown constraint '{constraint}'")]
    UnknownConstraint { resource: String, constraint: String },

    #[error("Constraint name '{0}' is defined more than once")]
    DuplicateConstraint(String),

    #[error("Invalid resource address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressParseError,
    },

    #[error("Role mapping for '{0}' cannot be scoped to both hosts and server groups")]
    ConflictingScope(String),

    #[error("Server '{server}' on host '{host}' belongs to undeclared server group '{group}'")]
    UnknownServerGroup {
        host: String,
        server: String,
        group: String,
    },
}

/// Top-level access control manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControlConfig {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: AccessControlSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControlSpec {
    #[serde(default)]
    pub combination_policy: CombinationPolicy,

    /// Role name to the effects it may exercise where no constraint applies.
    #[serde(default = "default_roles")]
    pub roles: BTreeMap<String, EffectSet>,

    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,

    #[serde(default)]
    pub resources: Vec<ResourceSpec>,

    #[serde(default)]
    pub topology: Topology,

    #[serde(default)]
    pub caller: CallerSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintSpec {
    pub kind: ConstraintKind,

    #[serde(default)]
    pub owner: ConstraintOwner,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Effects this constraint bears on.
    pub effects: EffectSet,

    /// Roles permitted to exercise those effects.
    #[serde(default)]
    pub permitted_roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Address pattern; `*` matches any instance.
    pub address: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,

    /// Attribute name to the constraints that apply to it alone.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<OperationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerSpec {
    pub name: String,

    #[serde(default)]
    pub roles: Vec<RoleMappingSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMappingSpec {
    pub role: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_groups: Vec<String>,
}

impl RoleMappingSpec {
    pub fn global(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            hosts: Vec::new(),
            server_groups: Vec::new(),
        }
    }

    pub fn to_mapping(&self) -> RoleMapping {
        if !self.hosts.is_empty() {
            RoleMapping::hosts(&self.role, self.hosts.iter().cloned())
        } else if !self.server_groups.is_empty() {
            RoleMapping::server_groups(&self.role, self.server_groups.iter().cloned())
        } else {
            RoleMapping::global(&self.role)
        }
    }
}

impl CallerSpec {
    pub fn to_caller(&self) -> Caller {
        self.roles
            .iter()
            .fold(Caller::new(&self.name), |caller, mapping| {
                caller.with_mapping(mapping.to_mapping())
            })
    }
}

impl Default for CallerSpec {
    fn default() -> Self {
        Self {
            name: "admin".to_string(),
            roles: vec![RoleMappingSpec::global(StandardRole::SuperUser.name())],
        }
    }
}

fn default_roles() -> BTreeMap<String, EffectSet> {
    StandardRole::ALL
        .into_iter()
        .map(|role| (role.name().to_string(), role.default_effects()))
        .collect()
}

fn default_constraints() -> Vec<ConstraintSpec> {
    use ActionEffect::*;

    let admins = || vec!["Administrator".to_string(), "SuperUser".to_string()];
    vec![
        ConstraintSpec {
            kind: ConstraintKind::Sensitivity,
            owner: ConstraintOwner::Core,
            name: "credential".to_string(),
            description: Some("Passwords, keys and other secrets".to_string()),
            effects: EffectSet::of(&[ReadConfig, ReadRuntime, WriteConfig, WriteRuntime]),
            permitted_roles: admins(),
        },
        ConstraintSpec {
            kind: ConstraintKind::Sensitivity,
            owner: ConstraintOwner::Core,
            name: "security-realm".to_string(),
            description: Some("Management security realms".to_string()),
            effects: EffectSet::of(&[WriteConfig, WriteRuntime]),
            permitted_roles: admins(),
        },
        ConstraintSpec {
            kind: ConstraintKind::Sensitivity,
            owner: ConstraintOwner::Core,
            name: "vault".to_string(),
            description: Some("Secret store; hidden from non-administrators".to_string()),
            effects: EffectSet::all(),
            permitted_roles: admins(),
        },
        ConstraintSpec {
            kind: ConstraintKind::Application,
            owner: ConstraintOwner::Core,
            name: "deployment".to_string(),
            description: Some("Application deployments".to_string()),
            effects: EffectSet::of(&[WriteConfig, WriteRuntime]),
            permitted_roles: vec![
                "Deployer".to_string(),
                "Maintainer".to_string(),
                "Administrator".to_string(),
                "SuperUser".to_string(),
            ],
        },
    ]
}

fn resource(address: &str, constraints: &[&str], operations: &[(&str, OperationFlags)]) -> ResourceSpec {
    ResourceSpec {
        address: address.to_string(),
        constraints: constraints.iter().map(|c| c.to_string()).collect(),
        attributes: BTreeMap::new(),
        operations: operations
            .iter()
            .map(|(name, flags)| OperationEntry::new(*name, *flags))
            .collect(),
    }
}

fn default_resources() -> Vec<ResourceSpec> {
    let lifecycle = [
        ("start", OperationFlags::RUNTIME_ONLY),
        ("stop", OperationFlags::RUNTIME_ONLY),
        ("reload", OperationFlags::RUNTIME_ONLY),
    ];
    let deployment_ops = [
        ("add", OperationFlags::READ_WRITE),
        ("remove", OperationFlags::READ_WRITE),
        ("deploy", OperationFlags::READ_WRITE),
        ("undeploy", OperationFlags::READ_WRITE),
    ];
    let mut datasource = resource(
        "/subsystem=datasources/data-source=*",
        &[],
        &[("test-connection", OperationFlags::RUNTIME_READ_ONLY)],
    );
    datasource
        .attributes
        .insert("password".to_string(), vec!["credential".to_string()]);

    vec![
        resource("/", &[], &[("reload", OperationFlags::RUNTIME_ONLY)]),
        resource("/host=*", &[], &[("reload", OperationFlags::RUNTIME_ONLY)]),
        resource("/host=*/server=*", &[], &lifecycle),
        resource("/host=*/server-config=*", &[], &lifecycle),
        resource(
            "/server-group=*",
            &[],
            &[
                ("start-servers", OperationFlags::RUNTIME_ONLY),
                ("stop-servers", OperationFlags::RUNTIME_ONLY),
            ],
        ),
        resource("/deployment=*", &["deployment"], &deployment_ops),
        resource("/server-group=*/deployment=*", &["deployment"], &deployment_ops),
        resource("/subsystem=datasources", &[], &[]),
        datasource,
        resource("/subsystem=logging", &[], &[]),
        resource("/core-service=management", &[], &[]),
        resource(
            "/core-service=management/security-realm=*",
            &["security-realm"],
            &[],
        ),
        resource("/core-service=vault", &["vault"], &[]),
    ]
}

fn default_topology() -> Topology {
    let server = |name: &str, group: &str| ServerSpec {
        name: name.to_string(),
        group: group.to_string(),
    };
    Topology {
        mode: ControllerMode::Domain,
        hosts: vec![
            HostSpec {
                name: "primary".to_string(),
                servers: vec![
                    server("server-one", "main-server-group"),
                    server("server-two", "main-server-group"),
                ],
            },
            HostSpec {
                name: "secondary".to_string(),
                servers: vec![server("server-three", "other-server-group")],
            },
        ],
        server_groups: vec!["main-server-group".to_string(), "other-server-group".to_string()],
    }
}

impl Default for AccessControlSpec {
    fn default() -> Self {
        Self {
            combination_policy: CombinationPolicy::default(),
            roles: default_roles(),
            constraints: default_constraints(),
            resources: default_resources(),
            topology: default_topology(),
            caller: CallerSpec::default(),
        }
    }
}

impl Default for AccessControlConfig {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "default".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: AccessControlSpec::default(),
        }
    }
}

impl AccessControlConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover a configuration file using precedence order
    /// 1. MGMT_ACCESS_CONFIG_PATH environment variable
    /// 2. ./mgmt-access.yaml (working directory)
    /// 3. ~/.mgmt-access/config.yaml (user home)
    /// 4. /etc/mgmt-access/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./mgmt-access.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".mgmt-access").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/mgmt-access/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, falling back to defaults.
    ///
    /// An explicit path must exist and parse.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .with_context(|| format!("Failed to load config at {:?}", path))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = match Self::discover_config() {
            Some(config_path) => {
                tracing::info!("Loading configuration from discovered path: {:?}", config_path);
                Self::from_yaml_file(config_path)?
            }
            None => {
                tracing::warn!("No configuration file found in standard locations. Using defaults.");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(COMBINATION_POLICY_ENV) {
            match val.parse::<CombinationPolicy>() {
                Ok(policy) => {
                    tracing::info!("Environment override: {}={}", COMBINATION_POLICY_ENV, policy);
                    self.spec.combination_policy = policy;
                }
                Err(e) => {
                    tracing::warn!("Ignoring {}: {}", COMBINATION_POLICY_ENV, e);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_version != API_VERSION {
            return Err(ConfigError::InvalidApiVersion(self.api_version.clone()));
        }
        if self.kind != KIND {
            return Err(ConfigError::InvalidKind(self.kind.clone()));
        }
        if self.metadata.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }

        let spec = &self.spec;
        let known_role = |role: &str| spec.roles.keys().any(|r| r.eq_ignore_ascii_case(role));

        let mut names = Vec::new();
        for constraint in &spec.constraints {
            if names.contains(&constraint.name.as_str()) {
                return Err(ConfigError::DuplicateConstraint(constraint.name.clone()));
            }
            names.push(constraint.name.as_str());
            if let Some(role) = constraint.permitted_roles.iter().find(|r| !known_role(r.as_str())) {
                return Err(ConfigError::UnknownRole {
                    context: format!("constraint '{}'", constraint.name),
                    role: role.clone(),
                });
            }
        }

        for resource in &spec.resources {
            resource
                .address
                .parse::<PathAddress>()
                .map_err(|source| ConfigError::InvalidAddress {
                    address: resource.address.clone(),
                    source,
                })?;
            let referenced = resource
                .constraints
                .iter()
                .chain(resource.attributes.values().flatten());
            for constraint in referenced {
                if !names.contains(&constraint.as_str()) {
                    return Err(ConfigError::UnknownConstraint {
                        resource: resource.address.clone(),
                        constraint: constraint.clone(),
                    });
                }
            }
        }

        for host in &spec.topology.hosts {
            for server in &host.servers {
                if !spec.topology.has_server_group(&server.group) {
                    return Err(ConfigError::UnknownServerGroup {
                        host: host.name.clone(),
                        server: server.name.clone(),
                        group: server.group.clone(),
                    });
                }
            }
        }

        for mapping in &spec.caller.roles {
            if !known_role(mapping.role.as_str()) {
                return Err(ConfigError::UnknownRole {
                    context: format!("caller '{}'", spec.caller.name),
                    role: mapping.role.clone(),
                });
            }
            if !mapping.hosts.is_empty() && !mapping.server_groups.is_empty() {
                return Err(ConfigError::ConflictingScope(mapping.role.clone()));
            }
        }

        Ok(())
    }
}
