// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # mgmt-access Console
//!
//! Inspects what a management identity may do, using the same decision
//! point and requirement trees a management console would.
//!
//! ## Commands
//!
//! - `mgmt-access authorize ADDRESS [OPERATION]` - Run one access check
//! - `mgmt-access commands [COMMAND] [--explain]` - List available commands or options
//! - `mgmt-access targets COMMAND` - List the hosts, servers or groups a command may act on
//! - `mgmt-access config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use mgmt_access::commands::{self, AuthorizeArgs, CommandsArgs, ConfigCommand, TargetsArgs};
use mgmt_access::session::SessionOptions;

/// Management access control console
#[derive(Parser)]
#[command(name = "mgmt-access")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "MGMT_ACCESS_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Act as this caller instead of the configured one
    #[arg(long = "as", global = true, value_name = "NAME")]
    caller: Option<String>,

    /// Act with these global roles instead of the configured mappings
    #[arg(long = "role", global = true, value_name = "ROLE")]
    roles: Vec<String>,

    /// Treat queries to this host as failing (repeatable)
    #[arg(long, global = true, value_name = "HOST")]
    unreachable: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "MGMT_ACCESS_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one operation or attribute access
    #[command(name = "authorize")]
    Authorize(AuthorizeArgs),

    /// List console commands, or a command's options, available to the caller
    #[command(name = "commands")]
    Commands(CommandsArgs),

    /// List the instances a command may act on
    #[command(name = "targets")]
    Targets(TargetsArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let options = SessionOptions {
        config: cli.config.clone(),
        caller: cli.caller,
        roles: cli.roles,
        unreachable: cli.unreachable,
    };

    match cli.command {
        Some(Commands::Authorize(args)) => commands::authorize::handle_command(args, &options).await,
        Some(Commands::Commands(args)) => commands::catalog::handle_commands(args, &options).await,
        Some(Commands::Targets(args)) => commands::catalog::handle_targets(args, &options).await,
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
