// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use mgmt_access_core::domain::config::{AccessControlConfig, CONFIG_PATH_ENV};
use mgmt_access_core::domain::environment::ControllerMode;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the full manifest as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate the default configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./mgmt-access.yaml")]
        output: PathBuf,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml),
        ConfigCommand::Validate { file } => {
            let config = validate(file.or(config_override))?;
            println!("{}", "✓ Configuration is valid".green());
            println!(
                "  {} constraints, {} resources, {} mode",
                config.spec.constraints.len(),
                config.spec.resources.len(),
                config.spec.topology.mode
            );
            Ok(())
        }
        ConfigCommand::Generate { output } => {
            generate(&output)?;
            println!(
                "{}",
                format!("✓ Configuration generated: {}", output.display()).green()
            );
            Ok(())
        }
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool, yaml: bool) -> Result<()> {
    let config = AccessControlConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./mgmt-access.yaml");
        println!("  4. ~/.mgmt-access/config.yaml");
        println!("  5. /etc/mgmt-access/config.yaml");
        println!();
    }

    if yaml {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let spec = &config.spec;
    println!("{}", format!("Current configuration ({}):", config.metadata.name).bold());
    println!("  Combination policy: {}", spec.combination_policy);
    println!();

    println!("{}", "Roles:".bold());
    for (role, effects) in &spec.roles {
        println!("  {:<16} {}", role, effects);
    }
    println!();

    println!("{}", "Constraints:".bold());
    for constraint in &spec.constraints {
        println!(
            "  {} ({:?}) {} → {}",
            constraint.name.bold(),
            constraint.kind,
            constraint.effects,
            constraint.permitted_roles.join(", ")
        );
    }
    println!();

    println!("{}", "Topology:".bold());
    println!("  Mode: {}", spec.topology.mode);
    if spec.topology.mode == ControllerMode::Domain {
        for host in &spec.topology.hosts {
            println!("  host={}", host.name);
            for server in &host.servers {
                println!("    server={} ({})", server.name, server.group);
            }
        }
    }
    println!();

    println!("{}", "Caller:".bold());
    println!("  Name: {}", spec.caller.name);
    for mapping in &spec.caller.roles {
        let scope = if !mapping.hosts.is_empty() {
            format!(" hosts={}", mapping.hosts.join(","))
        } else if !mapping.server_groups.is_empty() {
            format!(" server-groups={}", mapping.server_groups.join(","))
        } else {
            String::new()
        };
        println!("  - {}{}", mapping.role, scope);
    }

    Ok(())
}

/// Load and validate the configuration at `path`, or the discovered one.
pub fn validate(path: Option<PathBuf>) -> Result<AccessControlConfig> {
    let config = AccessControlConfig::load_or_default(path).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

pub fn generate(output: &Path) -> Result<()> {
    AccessControlConfig::default()
        .to_yaml_file(output)
        .with_context(|| format!("Failed to write config to {:?}", output))
}
