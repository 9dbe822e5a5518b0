// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Check Service
//!
//! Entry point for operation dispatch and attribute access. Every check
//! authorizes the `address` effect on its own first: a caller who may not
//! address a resource gets [`AuthorizationError::ResourceNotFound`], exactly
//! as if the resource did not exist. Only then are the remaining effects
//! authorized and reported as [`AuthorizationError::Unauthorized`].

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::application::authorizer::{authorize_address_incrementally, AddressVisibility, Authorizer};
use crate::domain::action::{Action, OperationEntry, OperationFlags};
use crate::domain::address::PathAddress;
use crate::domain::caller::Caller;
use crate::domain::effect::ActionEffect;
use crate::domain::environment::Environment;
use crate::domain::events::AccessEvent;
use crate::domain::resource_model::ResourceModel;
use crate::domain::result::{AuthorizationError, AuthorizationResult, Explanation};
use crate::domain::target::Target;
use crate::infrastructure::audit::AccessAuditLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeAccess {
    Read,
    Write,
}

#[derive(Clone)]
pub struct AccessCheckService {
    authorizer: Arc<dyn Authorizer>,
    resources: Arc<ResourceModel>,
    audit: AccessAuditLogger,
}

impl AccessCheckService {
    pub fn new(authorizer: Arc<dyn Authorizer>, resources: Arc<ResourceModel>) -> Self {
        Self {
            authorizer,
            resources,
            audit: AccessAuditLogger::new(),
        }
    }

    pub fn resources(&self) -> &ResourceModel {
        &self.resources
    }

    pub fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer.as_ref()
    }

    /// Authorize `operation` at `address`, returning the classified action.
    pub fn check_operation(
        &self,
        caller: &Caller,
        environment: &Environment,
        address: &PathAddress,
        operation: &str,
    ) -> Result<Action, AuthorizationError> {
        self.ensure_addressable(caller, environment, address, operation)?;

        let entry = self
            .resources
            .operation(address, operation)
            .ok_or_else(|| AuthorizationError::OperationNotFound {
                operation: operation.to_string(),
                address: address.clone(),
            })?;
        let action = Action::new(entry, address.clone());
        let target: Target = self.resources.target_for(address).into();
        let result = self.authorizer.authorize(caller, environment, &action, &target);
        self.audit_denial(caller, &action, &result);
        result.fail_if_denied(&action)?;
        debug!(caller = caller.name(), operation, address = %address, "Operation authorized");
        Ok(action)
    }

    pub fn is_executable(
        &self,
        caller: &Caller,
        environment: &Environment,
        address: &PathAddress,
        operation: &str,
    ) -> bool {
        self.check_operation(caller, environment, address, operation)
            .is_ok()
    }

    /// Authorize reading or writing one attribute, independently of the
    /// other attributes of the resource.
    pub fn check_attribute(
        &self,
        caller: &Caller,
        environment: &Environment,
        address: &PathAddress,
        attribute: &str,
        access: AttributeAccess,
    ) -> Result<(), AuthorizationError> {
        let (operation, flags, effect) = match access {
            AttributeAccess::Read => ("read-attribute", OperationFlags::READ_ONLY, ActionEffect::ReadConfig),
            AttributeAccess::Write => ("write-attribute", OperationFlags::READ_WRITE, ActionEffect::WriteConfig),
        };
        self.ensure_addressable(caller, environment, address, operation)?;

        let action = Action::new(OperationEntry::new(operation, flags), address.clone()).limit_action(effect);
        let target: Target = self.resources.target_for_attribute(address, attribute).into();
        let result = self.authorizer.authorize(caller, environment, &action, &target);
        self.audit_denial(caller, &action, &result);
        result.fail_if_denied(&action)
    }

    /// `address` as far as `caller` may see it.
    pub fn visible_address(
        &self,
        caller: &Caller,
        environment: &Environment,
        address: &PathAddress,
    ) -> AddressVisibility {
        authorize_address_incrementally(
            self.authorizer.as_ref(),
            caller,
            environment,
            address,
            |prefix| self.resources.target_for(prefix).into(),
        )
    }

    fn ensure_addressable(
        &self,
        caller: &Caller,
        environment: &Environment,
        address: &PathAddress,
        operation: &str,
    ) -> Result<(), AuthorizationError> {
        if !self.resources.contains(address) {
            return Err(AuthorizationError::ResourceNotFound {
                address: address.clone(),
            });
        }
        let probe = Action::unknown(address.clone()).limit_action(ActionEffect::Address);
        let target: Target = self.resources.target_for(address).into();
        let result = self.authorizer.authorize(caller, environment, &probe, &target);
        if !result.is_permitted() {
            let visibility = self.visible_address(caller, environment, address);
            self.audit.record(&AccessEvent::ResourceHidden {
                caller: caller.name().to_string(),
                operation: operation.to_string(),
                visible_address: visibility.address,
                hidden_at: Utc::now(),
            });
            return Err(AuthorizationError::ResourceNotFound {
                address: address.clone(),
            });
        }
        Ok(())
    }

    fn audit_denial(&self, caller: &Caller, action: &Action, result: &AuthorizationResult) {
        let Some(explanation) = result.explanation() else {
            return;
        };
        let event = match explanation {
            Explanation::AmbiguousConstraints { constraints, .. } => AccessEvent::AmbiguousConstraints {
                caller: caller.name().to_string(),
                operation: action.operation_name().to_string(),
                address: action.address().clone(),
                constraints: constraints.clone(),
                detected_at: Utc::now(),
            },
            other => AccessEvent::AccessDenied {
                caller: caller.name().to_string(),
                operation: action.operation_name().to_string(),
                address: action.address().clone(),
                effect: denied_effect(other),
                reason: other.to_string(),
                denied_at: Utc::now(),
            },
        };
        self.audit.record(&event);
    }
}

fn denied_effect(explanation: &Explanation) -> Option<ActionEffect> {
    match explanation {
        Explanation::NotAddressable => Some(ActionEffect::Address),
        Explanation::EffectNotPermitted { effect }
        | Explanation::ConstraintDenied { effect, .. }
        | Explanation::AmbiguousConstraints { effect, .. }
        | Explanation::SensitiveMBean { effect } => Some(*effect),
    }
}
