// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `commands` and `targets`: what the session caller may do from a console.

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use mgmt_access_requirements::CommandTargets;

use crate::session::{Session, SessionOptions};

#[derive(Args, Debug)]
pub struct CommandsArgs {
    /// List the available options of this command instead
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Show the requirement gating each entry
    #[arg(long)]
    pub explain: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Command whose allowed targets to list, e.g. start-server
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub description: String,
    pub requirement: String,
}

/// Available commands, or the available options of `command`.
pub async fn available(session: &Session, command: Option<&str>) -> Result<Vec<Entry>> {
    let catalog = session.catalog();
    let conn = session.connection();
    match command {
        None => Ok(catalog
            .available_commands(conn)
            .await
            .into_iter()
            .map(|c| Entry {
                name: c.name.clone(),
                description: c.description.clone(),
                requirement: c.requirement.to_string(),
            })
            .collect()),
        Some(name) => {
            let options = catalog
                .available_options(conn, name)
                .await
                .ok_or_else(|| anyhow!("Command '{}' is not available", name))?;
            Ok(options
                .into_iter()
                .map(|o| Entry {
                    name: o.name.clone(),
                    description: o.description.clone(),
                    requirement: o.requirement.to_string(),
                })
                .collect())
        }
    }
}

pub async fn handle_commands(args: CommandsArgs, options: &SessionOptions) -> Result<()> {
    let session = Session::open(options)?;
    let entries = available(&session, args.command.as_deref()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let heading = match &args.command {
        Some(command) => format!("Options of '{}' available to {}:", command, session.caller().name()),
        None => format!("Commands available to {}:", session.caller().name()),
    };
    println!("{}", heading.bold());
    if entries.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for entry in &entries {
        println!("  {:<20} {}", entry.name.bold(), entry.description);
        if args.explain {
            println!("  {:<20} {}", "", entry.requirement.dimmed());
        }
    }
    Ok(())
}

pub async fn targets(session: &Session, command: &str) -> Result<CommandTargets> {
    if session.catalog().command(command).is_none() {
        return Err(anyhow!("Unknown command '{}'", command));
    }
    session
        .catalog()
        .targets(session.connection(), command)
        .await
        .ok_or_else(|| anyhow!("Command '{}' does not act on topology instances", command))
}

pub async fn handle_targets(args: TargetsArgs, options: &SessionOptions) -> Result<()> {
    let session = Session::open(options)?;
    let targets = targets(&session, &args.command).await?;

    if args.json {
        let value = match &targets {
            CommandTargets::Instances { node_type, names } => {
                let mut map = serde_json::Map::new();
                map.insert(node_type.clone(), json!(names));
                serde_json::Value::Object(map)
            }
            CommandTargets::Servers(hosts) => {
                let hosts: serde_json::Map<String, serde_json::Value> = hosts
                    .iter()
                    .map(|(host, servers)| (host.clone(), json!(servers)))
                    .collect();
                json!({ "hosts": hosts })
            }
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", format!("Targets of '{}':", args.command).bold());
    match targets {
        CommandTargets::Instances { node_type, names } => {
            if names.is_empty() {
                println!("  {}", format!("(no {})", node_type).dimmed());
            }
            for name in names {
                println!("  {}={}", node_type, name);
            }
        }
        CommandTargets::Servers(hosts) => {
            if hosts.is_empty() {
                println!("  {}", "(no servers)".dimmed());
            }
            for (host, servers) in hosts {
                println!("  {}", format!("host={}", host).bold());
                for server in servers {
                    println!("    server={}", server);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgmt_access_core::domain::config::AccessControlConfig;

    fn session(roles: &[&str], unreachable: &[&str]) -> Session {
        let options = SessionOptions {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            unreachable: unreachable.iter().map(|h| h.to_string()).collect(),
            ..SessionOptions::default()
        };
        Session::from_config(AccessControlConfig::default(), &options).unwrap()
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_monitor_commands() {
        let session = session(&["Monitor"], &[]);
        let entries = available(&session, None).await.unwrap();
        assert_eq!(names(&entries), vec!["read-resource", "ls", "help"]);
        assert_eq!(entries[2].requirement, "all(always)");
        assert!(available(&session, Some("deploy")).await.is_err());
    }

    #[tokio::test]
    async fn test_maintainer_deploy_options() {
        let session = session(&["Maintainer"], &[]);
        let entries = available(&session, Some("deploy")).await.unwrap();
        assert_eq!(
            names(&entries),
            vec!["--server-groups", "--all-server-groups", "--force"]
        );
    }

    #[tokio::test]
    async fn test_targets_skip_unreachable_hosts() {
        let session = session(&["Operator"], &["primary"]);
        let targets = targets(&session, "stop-server").await.unwrap();
        assert_eq!(
            targets,
            CommandTargets::Servers(vec![(
                "secondary".to_string(),
                vec!["server-three".to_string()]
            )])
        );
    }

    #[tokio::test]
    async fn test_targets_of_unknown_or_plain_command_fail() {
        let session = session(&["SuperUser"], &[]);
        assert!(targets(&session, "nope").await.is_err());
        assert!(targets(&session, "ls").await.is_err());
    }
}
