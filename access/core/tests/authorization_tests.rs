// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use mgmt_access_core::application::access_service::{AccessCheckService, AttributeAccess};
use mgmt_access_core::application::model::AccessControlModel;
use mgmt_access_core::domain::address::PathAddress;
use mgmt_access_core::domain::caller::{Caller, RoleMapping};
use mgmt_access_core::domain::combination::CombinationPolicy;
use mgmt_access_core::domain::config::{AccessControlConfig, ConstraintSpec, ResourceSpec};
use mgmt_access_core::domain::constraint::{ConstraintKind, ConstraintOwner};
use mgmt_access_core::domain::effect::{ActionEffect, EffectSet};
use mgmt_access_core::domain::environment::Environment;
use mgmt_access_core::domain::result::{AuthorizationError, Explanation};
use mgmt_access_core::domain::topology::Topology;
use mgmt_access_core::infrastructure::constraint_registry::ConstraintRegistry;
use std::collections::BTreeMap;

fn addr(s: &str) -> PathAddress {
    s.parse().unwrap()
}

fn service_for(config: &AccessControlConfig) -> (AccessCheckService, Environment) {
    let registry = ConstraintRegistry::new();
    let model = AccessControlModel::from_config(config, &registry).unwrap();
    (model.access_service(), model.environment().clone())
}

fn default_service() -> (AccessCheckService, Environment) {
    service_for(&AccessControlConfig::default())
}

/// Two constraints that both bear on write-config for `/subsystem=mail`.
fn overlapping_constraints(policy: CombinationPolicy) -> AccessControlConfig {
    let mut config = AccessControlConfig::default();
    config.spec.combination_policy = policy;
    for (name, role) in [("alpha", "Maintainer"), ("beta", "SuperUser")] {
        config.spec.constraints.push(ConstraintSpec {
            kind: ConstraintKind::Application,
            owner: ConstraintOwner::Subsystem("mail".to_string()),
            name: name.to_string(),
            description: None,
            effects: EffectSet::of(&[ActionEffect::WriteConfig]),
            permitted_roles: vec![role.to_string()],
        });
    }
    config.spec.resources.push(ResourceSpec {
        address: "/subsystem=mail".to_string(),
        constraints: vec!["alpha".to_string(), "beta".to_string()],
        attributes: BTreeMap::new(),
        operations: vec![],
    });
    config
}

#[test]
fn test_hidden_resource_is_indistinguishable_from_missing() {
    let (service, env) = default_service();
    let monitor = Caller::new("mon").with_role("Monitor");

    let hidden = service
        .check_operation(&monitor, &env, &addr("/core-service=vault"), "read-resource")
        .unwrap_err();
    let missing = service
        .check_operation(&monitor, &env, &addr("/core-service=nothing"), "read-resource")
        .unwrap_err();

    assert!(matches!(hidden, AuthorizationError::ResourceNotFound { .. }));
    assert!(matches!(missing, AuthorizationError::ResourceNotFound { .. }));
    assert_eq!(
        hidden.to_string().replace("vault", "X"),
        missing.to_string().replace("nothing", "X")
    );

    let admin = Caller::new("admin").with_role("Administrator");
    assert!(service
        .check_operation(&admin, &env, &addr("/core-service=vault"), "read-resource")
        .is_ok());
}

#[test]
fn test_unknown_operation_on_hidden_resource_still_reports_not_found() {
    let (service, env) = default_service();
    let monitor = Caller::new("mon").with_role("Monitor");
    let err = service
        .check_operation(&monitor, &env, &addr("/core-service=vault"), "no-such-op")
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::ResourceNotFound { .. }));

    let err = service
        .check_operation(&monitor, &env, &addr("/subsystem=logging"), "no-such-op")
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::OperationNotFound { .. }));
}

#[test]
fn test_visible_resource_write_denial_carries_explanation() {
    let (service, env) = default_service();
    let monitor = Caller::new("mon").with_role("Monitor");
    let err = service
        .check_operation(&monitor, &env, &addr("/deployment=app.war"), "deploy")
        .unwrap_err();
    match err {
        AuthorizationError::Unauthorized {
            operation,
            address,
            explanation,
        } => {
            assert_eq!(operation, "deploy");
            assert_eq!(address, addr("/deployment=app.war"));
            assert!(matches!(
                explanation,
                Some(Explanation::ConstraintDenied {
                    effect: ActionEffect::WriteConfig,
                    ..
                })
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_application_constraint_grants_deployer() {
    let (service, env) = default_service();
    let deployer = Caller::new("dep").with_role("Deployer");
    assert!(service.is_executable(&deployer, &env, &addr("/deployment=app.war"), "deploy"));
    assert!(!service.is_executable(&deployer, &env, &addr("/subsystem=logging"), "write-attribute"));
}

#[test]
fn test_runtime_read_only_operation_effects() {
    let (service, env) = default_service();
    let monitor = Caller::new("mon").with_role("Monitor");
    let action = service
        .check_operation(
            &monitor,
            &env,
            &addr("/subsystem=datasources/data-source=main"),
            "test-connection",
        )
        .unwrap();
    assert_eq!(
        action.effects(),
        &EffectSet::of(&[ActionEffect::Address, ActionEffect::ReadRuntime])
    );
}

#[test]
fn test_operator_may_stop_servers() {
    let (service, env) = default_service();
    let operator = Caller::new("op").with_role("Operator");
    assert!(service.is_executable(&operator, &env, &addr("/host=primary/server=server-one"), "stop"));
    assert!(!service.is_executable(&operator, &env, &addr("/host=primary/server=server-nine"), "stop"));
}

#[test]
fn test_host_scoped_role_is_write_scoped_read_global() {
    let (service, env) = default_service();
    let caller = Caller::new("ops").with_mapping(RoleMapping::hosts("Maintainer", ["primary"]));

    assert!(service.is_executable(&caller, &env, &addr("/host=primary/server=server-one"), "stop"));

    let other_host = service
        .check_operation(&caller, &env, &addr("/host=secondary/server=server-three"), "stop")
        .unwrap_err();
    assert!(matches!(other_host, AuthorizationError::ResourceNotFound { .. }));

    assert!(service.is_executable(&caller, &env, &addr("/subsystem=logging"), "read-resource"));
    let write = service
        .check_operation(&caller, &env, &addr("/subsystem=logging"), "write-attribute")
        .unwrap_err();
    assert!(matches!(write, AuthorizationError::Unauthorized { .. }));
}

#[test]
fn test_server_group_scoped_role() {
    let (service, env) = default_service();
    let caller =
        Caller::new("grp").with_mapping(RoleMapping::server_groups("Operator", ["main-server-group"]));
    assert!(service.is_executable(&caller, &env, &addr("/host=primary/server=server-two"), "stop"));
    assert!(service.is_executable(&caller, &env, &addr("/server-group=main-server-group"), "stop-servers"));
    assert!(!service.is_executable(&caller, &env, &addr("/host=secondary/server=server-three"), "stop"));
}

#[test]
fn test_scoped_roles_do_not_apply_standalone() {
    let mut config = AccessControlConfig::default();
    config.spec.topology = Topology::standalone();
    let (service, env) = service_for(&config);
    assert!(env.is_standalone());

    let scoped = Caller::new("ops").with_mapping(RoleMapping::hosts("SuperUser", ["primary"]));
    let err = service
        .check_operation(&scoped, &env, &addr("/subsystem=logging"), "read-resource")
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::ResourceNotFound { .. }));
}

#[test]
fn test_permissive_policy_first_permit_wins() {
    let (service, env) = service_for(&overlapping_constraints(CombinationPolicy::Permissive));
    let maintainer = Caller::new("m").with_role("Maintainer");
    assert!(service.is_executable(&maintainer, &env, &addr("/subsystem=mail"), "write-attribute"));
}

#[test]
fn test_rejecting_policy_denies_ambiguity_as_internal_error() {
    let (service, env) = service_for(&overlapping_constraints(CombinationPolicy::Rejecting));
    let superuser = Caller::new("root").with_role("SuperUser");
    let err = service
        .check_operation(&superuser, &env, &addr("/subsystem=mail"), "write-attribute")
        .unwrap_err();
    match err {
        AuthorizationError::Unauthorized {
            explanation: Some(explanation),
            ..
        } => {
            assert!(explanation.is_internal_error());
            assert!(matches!(explanation, Explanation::AmbiguousConstraints { ref constraints, .. } if constraints.len() == 2));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Reads are untouched by the write-only constraints.
    assert!(service.is_executable(&superuser, &env, &addr("/subsystem=mail"), "read-resource"));
}

#[test]
fn test_sensitive_attribute_is_checked_independently() {
    let (service, env) = default_service();
    let monitor = Caller::new("mon").with_role("Monitor");
    let data_source = addr("/subsystem=datasources/data-source=main");

    assert!(service
        .check_attribute(&monitor, &env, &data_source, "jndi-name", AttributeAccess::Read)
        .is_ok());
    assert!(matches!(
        service.check_attribute(&monitor, &env, &data_source, "password", AttributeAccess::Read),
        Err(AuthorizationError::Unauthorized { .. })
    ));

    let admin = Caller::new("admin").with_role("Administrator");
    assert!(service
        .check_attribute(&admin, &env, &data_source, "password", AttributeAccess::Write)
        .is_ok());
}

#[test]
fn test_visible_address_redacts_hidden_suffix() {
    let mut config = AccessControlConfig::default();
    config.spec.resources.push(ResourceSpec {
        address: "/subsystem=security/secret=*".to_string(),
        constraints: vec!["vault".to_string()],
        attributes: BTreeMap::new(),
        operations: vec![],
    });
    let (service, env) = service_for(&config);
    let monitor = Caller::new("mon").with_role("Monitor");

    let visibility = service.visible_address(&monitor, &env, &addr("/subsystem=security/secret=db"));
    assert!(!visibility.fully_visible);
    assert_eq!(visibility.address.to_string(), "/subsystem=security/secret=<redacted>");

    let visibility = service.visible_address(&monitor, &env, &addr("/subsystem=logging"));
    assert!(visibility.fully_visible);

    let scoped = Caller::new("ops").with_mapping(RoleMapping::hosts("Maintainer", ["primary"]));
    let visibility = service.visible_address(&scoped, &env, &addr("/host=secondary/server=server-three"));
    assert_eq!(visibility.address.to_string(), "/host=<redacted>/server=<redacted>");
}

#[test]
fn test_explanation_serializes_with_reason_tag() {
    let value = serde_json::to_value(Explanation::EffectNotPermitted {
        effect: ActionEffect::WriteRuntime,
    })
    .unwrap();
    assert_eq!(value["reason"], "effect_not_permitted");
    assert_eq!(value["effect"], "write-runtime");
}

#[test]
fn test_model_registers_constraints_once() {
    let registry = ConstraintRegistry::new();
    let config = AccessControlConfig::default();
    AccessControlModel::from_config(&config, &registry).unwrap();
    let count = registry.len();
    AccessControlModel::from_config(&config, &registry).unwrap();
    assert_eq!(registry.len(), count);
    assert_eq!(registry.find_by_name(ConstraintKind::Sensitivity, "vault").len(), 1);
}
