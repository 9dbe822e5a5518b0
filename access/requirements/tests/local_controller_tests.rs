// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use mgmt_access_core::application::model::AccessControlModel;
use mgmt_access_core::domain::address::PathAddress;
use mgmt_access_core::domain::caller::{Caller, RoleMapping};
use mgmt_access_core::domain::config::AccessControlConfig;
use mgmt_access_core::domain::topology::Topology;
use mgmt_access_core::infrastructure::constraint_registry::ConstraintRegistry;
use mgmt_access_requirements::{
    CommandCatalog, CommandTargets, Connection, Enumerator, LocalController, ManagedConnection,
    Oracle, QueryError, RequirementRegistry,
};

struct Console {
    controller: Arc<LocalController>,
    conn: ManagedConnection,
    catalog: CommandCatalog,
}

fn console(config: &AccessControlConfig, caller: Caller) -> Console {
    let model = AccessControlModel::from_config(config, &ConstraintRegistry::new()).unwrap();
    let controller = Arc::new(LocalController::new(
        model.access_service(),
        caller,
        model.environment().clone(),
    ));
    let conn = controller.connect();
    let registry = Arc::new(RequirementRegistry::new());
    let catalog = CommandCatalog::standard(&registry).unwrap();
    conn.subscribe(registry);
    Console {
        controller,
        conn,
        catalog,
    }
}

fn domain_console(caller: Caller) -> Console {
    console(&AccessControlConfig::default(), caller)
}

async fn available(console: &Console) -> Vec<String> {
    console
        .catalog
        .available_commands(&console.conn)
        .await
        .into_iter()
        .map(|c| c.name.clone())
        .collect()
}

fn servers(pairs: &[(&str, &[&str])]) -> CommandTargets {
    CommandTargets::Servers(
        pairs
            .iter()
            .map(|(host, servers)| {
                (
                    host.to_string(),
                    servers.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect(),
    )
}

#[tokio::test]
async fn test_super_user_sees_every_command() {
    let console = domain_console(Caller::new("admin").with_role("SuperUser"));
    let names = available(&console).await;
    let all: Vec<String> = console.catalog.commands().iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, all);
}

#[tokio::test]
async fn test_monitor_sees_only_read_commands() {
    let console = domain_console(Caller::new("mon").with_role("Monitor"));
    assert_eq!(available(&console).await, vec!["read-resource", "ls", "help"]);
    assert!(console
        .catalog
        .available_options(&console.conn, "deploy")
        .await
        .is_none());
}

#[tokio::test]
async fn test_operator_targets_every_server() {
    let console = domain_console(Caller::new("op").with_role("Operator"));
    let names = available(&console).await;
    assert!(names.contains(&"start-server".to_string()));
    assert!(!names.contains(&"deploy".to_string()));

    let targets = console.catalog.targets(&console.conn, "start-server").await;
    assert_eq!(
        targets,
        Some(servers(&[
            ("primary", &["server-one", "server-two"]),
            ("secondary", &["server-three"]),
        ]))
    );
}

#[tokio::test]
async fn test_host_scoped_operator_targets_only_its_host() {
    let caller = Caller::new("op").with_mapping(RoleMapping::hosts("Operator", ["secondary"]));
    let console = domain_console(caller);

    let targets = console.catalog.targets(&console.conn, "stop-server").await;
    assert_eq!(targets, Some(servers(&[("secondary", &["server-three"])])));

    let reload = console.catalog.targets(&console.conn, "reload").await;
    assert_eq!(
        reload,
        Some(CommandTargets::Instances {
            node_type: "host".to_string(),
            names: vec!["secondary".to_string()],
        })
    );
}

#[tokio::test]
async fn test_group_scoped_deployer_deploys_to_its_group_only() {
    let caller = Caller::new("dep").with_mapping(RoleMapping::server_groups("Deployer", ["main-server-group"]));
    let console = domain_console(caller);

    assert!(available(&console).await.contains(&"deploy".to_string()));
    let options: Vec<String> = console
        .catalog
        .available_options(&console.conn, "deploy")
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.name.clone())
        .collect();
    assert_eq!(options, vec!["--server-groups"]);

    let targets = console.catalog.targets(&console.conn, "deploy").await;
    assert_eq!(
        targets,
        Some(CommandTargets::Instances {
            node_type: "server-group".to_string(),
            names: vec!["main-server-group".to_string()],
        })
    );
}

#[tokio::test]
async fn test_unreachable_host_is_skipped() {
    let console = domain_console(Caller::new("admin").with_role("SuperUser"));
    console.controller.set_unreachable(["primary"]);

    let err = console
        .controller
        .list_child_names(&"/host=primary".parse().unwrap(), "server")
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Transport(_)));

    let targets = console.catalog.targets(&console.conn, "start-server").await;
    assert_eq!(targets, Some(servers(&[("secondary", &["server-three"])])));
}

#[tokio::test]
async fn test_standalone_controller_offers_no_domain_commands() {
    let mut config = AccessControlConfig::default();
    config.spec.topology = Topology::standalone();
    let console = console(&config, Caller::new("admin").with_role("SuperUser"));

    let names = available(&console).await;
    assert!(names.contains(&"deploy".to_string()));
    assert!(names.contains(&"reload".to_string()));
    assert!(!names.contains(&"start-server".to_string()));

    let hosts = console
        .controller
        .list_child_names(&PathAddress::root(), "host")
        .await
        .unwrap();
    assert!(hosts.is_empty());
}

#[tokio::test]
async fn test_probe_is_scoped_under_prefix() {
    let console = domain_console(Caller::new("op").with_role("Operator"));
    let scope: PathAddress = "/host=primary/server=server-one".parse().unwrap();
    assert!(console
        .controller
        .is_executable(&scope, &PathAddress::root(), "start")
        .await
        .unwrap());
    assert!(!console
        .controller
        .is_executable(&PathAddress::root(), &"/deployment=*".parse().unwrap(), "add")
        .await
        .unwrap());

    let missing = console
        .controller
        .list_child_names(&"/host=tertiary".parse().unwrap(), "server")
        .await;
    assert!(matches!(missing, Err(QueryError::UnknownNode { .. })));
}

#[tokio::test]
async fn test_disconnect_reevaluates_against_new_reachability() {
    let console = domain_console(Caller::new("admin").with_role("SuperUser"));
    assert!(console.catalog.targets(&console.conn, "start-server").await.is_some());

    console.controller.set_unreachable(["primary", "secondary"]);
    console.conn.disconnect();
    assert!(!available(&console).await.contains(&"start-server".to_string()));
}
