// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `authorize`: run one access check as the session caller.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use mgmt_access_core::application::access_service::AttributeAccess;
use mgmt_access_core::domain::address::PathAddress;
use mgmt_access_core::domain::result::AuthorizationError;

use crate::session::{Session, SessionOptions};

#[derive(Args, Debug)]
pub struct AuthorizeArgs {
    /// Resource address, e.g. /subsystem=datasources/data-source=main
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Operation to check (omit with --attribute)
    #[arg(value_name = "OPERATION")]
    pub operation: Option<String>,

    /// Check access to one attribute instead of an operation
    #[arg(long, value_name = "NAME")]
    pub attribute: Option<String>,

    /// With --attribute, check write access instead of read access
    #[arg(long, requires = "attribute")]
    pub write: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Permitted,
    NotFound,
    Unauthorized,
    OperationNotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeReport {
    pub caller: String,
    pub address: String,
    pub operation: Option<String>,
    pub attribute: Option<String>,
    pub outcome: Outcome,
    /// Effects of the permitted action.
    pub effects: Vec<String>,
    /// The address as far as the caller may see it.
    pub visible_address: String,
    pub message: Option<String>,
}

pub fn evaluate(session: &Session, args: &AuthorizeArgs) -> Result<AuthorizeReport> {
    let address: PathAddress = args
        .address
        .parse()
        .with_context(|| format!("Invalid address '{}'", args.address))?;
    let service = session.service();
    let caller = session.caller();
    let environment = session.environment();

    let result = match (&args.attribute, &args.operation) {
        (Some(attribute), _) => {
            let access = if args.write {
                AttributeAccess::Write
            } else {
                AttributeAccess::Read
            };
            service
                .check_attribute(caller, environment, &address, attribute, access)
                .map(|()| Vec::new())
        }
        (None, Some(operation)) => service
            .check_operation(caller, environment, &address, operation)
            .map(|action| action.effects().iter().map(|e| e.as_str().to_string()).collect()),
        (None, None) => bail!("Either OPERATION or --attribute is required"),
    };

    let (outcome, effects, message) = match result {
        Ok(effects) => (Outcome::Permitted, effects, None),
        Err(e) => {
            let outcome = match &e {
                AuthorizationError::ResourceNotFound { .. } => Outcome::NotFound,
                AuthorizationError::Unauthorized { .. } => Outcome::Unauthorized,
                AuthorizationError::OperationNotFound { .. } => Outcome::OperationNotFound,
            };
            (outcome, Vec::new(), Some(e.to_string()))
        }
    };

    let visible = service.visible_address(caller, environment, &address);
    Ok(AuthorizeReport {
        caller: caller.name().to_string(),
        address: address.to_string(),
        operation: args.operation.clone(),
        attribute: args.attribute.clone(),
        outcome,
        effects,
        visible_address: visible.address.to_string(),
        message,
    })
}

pub async fn handle_command(args: AuthorizeArgs, options: &SessionOptions) -> Result<()> {
    let session = Session::open(options)?;
    let report = evaluate(&session, &args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let subject = match (&report.attribute, &report.operation) {
        (Some(attribute), _) if args.write => format!("write {}", attribute),
        (Some(attribute), _) => format!("read {}", attribute),
        (None, Some(operation)) => operation.clone(),
        (None, None) => String::new(),
    };
    match report.outcome {
        Outcome::Permitted => {
            println!(
                "{}",
                format!("✓ {} may {} at {}", report.caller, subject, report.address).green()
            );
            if !report.effects.is_empty() {
                println!("  Effects: {}", report.effects.join(", "));
            }
        }
        _ => {
            println!(
                "{}",
                format!("✗ {}", report.message.as_deref().unwrap_or("Denied")).red()
            );
            println!("  Visible address: {}", report.visible_address.dimmed());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgmt_access_core::domain::config::AccessControlConfig;

    fn session(role: &str) -> Session {
        let options = SessionOptions {
            caller: Some("tester".to_string()),
            roles: vec![role.to_string()],
            ..SessionOptions::default()
        };
        Session::from_config(AccessControlConfig::default(), &options).unwrap()
    }

    fn args(address: &str, operation: Option<&str>) -> AuthorizeArgs {
        AuthorizeArgs {
            address: address.to_string(),
            operation: operation.map(str::to_string),
            attribute: None,
            write: false,
            json: false,
        }
    }

    #[test]
    fn test_permitted_operation_reports_effects() {
        let report = evaluate(
            &session("Operator"),
            &args("/host=primary/server=server-one", Some("stop")),
        )
        .unwrap();
        assert_eq!(report.outcome, Outcome::Permitted);
        assert_eq!(report.effects, vec!["address", "read-runtime", "write-runtime"]);
    }

    #[test]
    fn test_hidden_resource_reports_not_found() {
        let report = evaluate(&session("Monitor"), &args("/core-service=vault", Some("read-resource"))).unwrap();
        assert_eq!(report.outcome, Outcome::NotFound);
        assert_eq!(report.visible_address, "/core-service=<redacted>");
        assert!(report.effects.is_empty());
    }

    #[test]
    fn test_attribute_write_is_checked_separately() {
        let mut check = args("/subsystem=datasources/data-source=main", None);
        check.attribute = Some("password".to_string());
        let maintainer = session("Maintainer");
        assert_eq!(evaluate(&maintainer, &check).unwrap().outcome, Outcome::Unauthorized);

        let admin = session("Administrator");
        check.write = true;
        assert_eq!(evaluate(&admin, &check).unwrap().outcome, Outcome::Permitted);
    }

    #[test]
    fn test_missing_operation_and_attribute_is_an_error() {
        assert!(evaluate(&session("Monitor"), &args("/", None)).is_err());
    }

    #[test]
    fn test_report_serializes_outcome_in_kebab_case() {
        let report = evaluate(&session("Monitor"), &args("/subsystem=logging", Some("reload"))).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "operation-not-found");
    }
}
