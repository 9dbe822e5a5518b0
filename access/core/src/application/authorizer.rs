// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Authorizer
//!
//! The server-side decision point. [`Authorizer::authorize`] is a pure
//! function of its inputs: the same caller, environment, action and target
//! always produce the same [`AuthorizationResult`].
//!
//! [`RoleBasedAuthorizer`] decides each effect of an action in order,
//! `address` first, and stops at the first denial:
//!
//! 1. Collect the caller's role mappings that apply to the target (scoped
//!    roles may apply fully, read-only, or not at all).
//! 2. If any constraint bears on the effect, the [`CombinationPolicy`]
//!    combines their verdicts.
//! 3. Otherwise the effect is permitted when any applicable role's base
//!    permissions include it.
//!
//! A denial of the `address` effect is always reported as
//! [`Explanation::NotAddressable`], so callers surface it as "not found".

use tracing::debug;

use crate::domain::action::Action;
use crate::domain::address::{PathAddress, PathElement};
use crate::domain::caller::{Caller, ScopeMatch};
use crate::domain::combination::CombinationPolicy;
use crate::domain::constraint::ConstraintRules;
use crate::domain::effect::ActionEffect;
use crate::domain::environment::Environment;
use crate::domain::result::{AuthorizationResult, Explanation};
use crate::domain::role::RolePermissions;
use crate::domain::target::Target;

pub trait Authorizer: Send + Sync {
    fn authorize(
        &self,
        caller: &Caller,
        environment: &Environment,
        action: &Action,
        target: &Target,
    ) -> AuthorizationResult;
}

#[derive(Debug, Clone)]
pub struct RoleBasedAuthorizer {
    policy: CombinationPolicy,
    roles: RolePermissions,
    rules: ConstraintRules,
}

impl RoleBasedAuthorizer {
    pub fn new(policy: CombinationPolicy, roles: RolePermissions, rules: ConstraintRules) -> Self {
        Self {
            policy,
            roles,
            rules,
        }
    }

    pub fn policy(&self) -> CombinationPolicy {
        self.policy
    }

    pub fn roles(&self) -> &RolePermissions {
        &self.roles
    }

    fn applicable_roles<'a>(
        &self,
        caller: &'a Caller,
        environment: &Environment,
        target: &Target,
    ) -> Vec<(&'a str, ScopeMatch)> {
        caller
            .roles()
            .iter()
            .map(|mapping| {
                let scope = mapping.applicability(
                    environment,
                    target.host_effect(),
                    target.server_group_effect(),
                );
                (mapping.role(), scope)
            })
            .filter(|(_, scope)| *scope != ScopeMatch::None)
            .collect()
    }

    fn is_administrative(&self, applicable: &[(&str, ScopeMatch)]) -> bool {
        applicable.iter().any(|(role, scope)| {
            *scope == ScopeMatch::Full
                && self.roles.grants(role, ActionEffect::WriteConfig)
                && self.roles.grants(role, ActionEffect::WriteRuntime)
        })
    }

    fn authorize_effect(
        &self,
        applicable: &[(&str, ScopeMatch)],
        effect: ActionEffect,
        target: &Target,
    ) -> AuthorizationResult {
        let roles: Vec<&str> = applicable
            .iter()
            .filter(|(_, scope)| *scope == ScopeMatch::Full || effect.is_read_only())
            .map(|(role, _)| *role)
            .collect();

        let verdicts = self.rules.verdicts(target.constraints(), &roles, effect);
        if let Some(result) = self.policy.resolve(effect, verdicts) {
            return result;
        }

        if roles.iter().any(|role| self.roles.grants(role, effect)) {
            AuthorizationResult::PERMITTED
        } else {
            AuthorizationResult::deny(Explanation::EffectNotPermitted { effect })
        }
    }
}

impl Authorizer for RoleBasedAuthorizer {
    fn authorize(
        &self,
        caller: &Caller,
        environment: &Environment,
        action: &Action,
        target: &Target,
    ) -> AuthorizationResult {
        let applicable = self.applicable_roles(caller, environment, target);

        if let Some(jmx) = target.as_jmx() {
            if jmx.is_non_facade_sensitive() && !self.is_administrative(&applicable) {
                let effect = action.effects().iter().next().unwrap_or(ActionEffect::Address);
                debug!(
                    caller = caller.name(),
                    method = jmx.method(),
                    object_name = jmx.object_name(),
                    "Sensitive MBean call denied"
                );
                return AuthorizationResult::deny(Explanation::SensitiveMBean { effect });
            }
        }

        for effect in action.effects().iter() {
            let result = self.authorize_effect(&applicable, effect, target);
            if result.is_permitted() {
                continue;
            }
            debug!(
                caller = caller.name(),
                operation = action.operation_name(),
                address = %action.address(),
                effect = %effect,
                "Effect denied"
            );
            if effect == ActionEffect::Address {
                return AuthorizationResult::deny(Explanation::NotAddressable);
            }
            return result;
        }
        AuthorizationResult::PERMITTED
    }
}

/// An address as far as the caller may see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressVisibility {
    pub address: PathAddress,
    pub fully_visible: bool,
}

/// Authorize the `address` effect on each prefix of `address`, root first.
///
/// At the first prefix the caller may not address, that element's value and
/// every later value is replaced with the redaction placeholder; the walk
/// does not fail.
pub fn authorize_address_incrementally<F>(
    authorizer: &dyn Authorizer,
    caller: &Caller,
    environment: &Environment,
    address: &PathAddress,
    mut resolve_target: F,
) -> AddressVisibility
where
    F: FnMut(&PathAddress) -> Target,
{
    for len in 1..=address.len() {
        let prefix = address.prefix(len);
        let action = Action::unknown(prefix.clone()).limit_action(ActionEffect::Address);
        let target = resolve_target(&prefix);
        if authorizer
            .authorize(caller, environment, &action, &target)
            .is_permitted()
        {
            continue;
        }
        let elements = address.elements();
        let redacted: PathAddress = elements[..len - 1]
            .iter()
            .cloned()
            .chain(elements[len - 1..].iter().map(|e| PathElement::redacted(e.key.clone())))
            .collect();
        return AddressVisibility {
            address: redacted,
            fully_visible: false,
        };
    }
    AddressVisibility {
        address: address.clone(),
        fully_visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::{OperationEntry, OperationFlags};
    use crate::domain::constraint::{
        AccessConstraintDefinition, ConstraintKind, ConstraintOwner, ConstraintRule,
    };
    use crate::domain::effect::EffectSet;
    use crate::domain::target::{JmxImpact, JmxTarget, TargetResource};
    use std::sync::Arc;

    fn authorizer(rules: ConstraintRules) -> RoleBasedAuthorizer {
        RoleBasedAuthorizer::new(CombinationPolicy::Permissive, RolePermissions::standard(), rules)
    }

    fn resource(address: &str) -> (PathAddress, Target) {
        let address: PathAddress = address.parse().unwrap();
        let target = TargetResource::new(address.clone(), vec![]).into();
        (address, target)
    }

    #[test]
    fn test_monitor_may_read_but_not_write() {
        let authorizer = authorizer(ConstraintRules::new());
        let caller = Caller::new("mon").with_role("Monitor");
        let env = Environment::standalone();
        let (address, target) = resource("/subsystem=logging");

        let read = Action::new(OperationEntry::new("read-resource", OperationFlags::READ_ONLY), address.clone());
        assert!(authorizer.authorize(&caller, &env, &read, &target).is_permitted());

        let write = Action::new(OperationEntry::new("write-attribute", OperationFlags::READ_WRITE), address);
        let result = authorizer.authorize(&caller, &env, &write, &target);
        assert_eq!(
            result.explanation(),
            Some(&Explanation::EffectNotPermitted {
                effect: ActionEffect::WriteConfig
            })
        );
    }

    #[test]
    fn test_caller_without_roles_cannot_address() {
        let authorizer = authorizer(ConstraintRules::new());
        let caller = Caller::new("nobody");
        let (address, target) = resource("/subsystem=logging");
        let action = Action::new(OperationEntry::new("read-resource", OperationFlags::READ_ONLY), address);
        let result = authorizer.authorize(&caller, &Environment::standalone(), &action, &target);
        assert_eq!(result.explanation(), Some(&Explanation::NotAddressable));
    }

    #[test]
    fn test_constraint_overrides_base_permissions() {
        let secret = Arc::new(AccessConstraintDefinition::new(
            ConstraintKind::Sensitivity,
            ConstraintOwner::Core,
            "credential",
        ));
        let rules = ConstraintRules::new().with_rule(
            &secret,
            ConstraintRule::new(EffectSet::of(&[ActionEffect::ReadConfig]), ["Administrator"]),
        );
        let authorizer = authorizer(rules);
        let address: PathAddress = "/subsystem=datasources/data-source=main".parse().unwrap();
        let target: Target = TargetResource::new(address.clone(), vec![secret]).into();
        let read = Action::new(OperationEntry::new("read-resource", OperationFlags::READ_ONLY), address);
        let env = Environment::standalone();

        let maintainer = Caller::new("m").with_role("Maintainer");
        assert!(!authorizer.authorize(&maintainer, &env, &read, &target).is_permitted());
        let admin = Caller::new("a").with_role("administrator");
        assert!(authorizer.authorize(&admin, &env, &read, &target).is_permitted());
    }

    #[test]
    fn test_sensitive_mbean_requires_administrative_role() {
        let authorizer = authorizer(ConstraintRules::new());
        let target: Target = JmxTarget::new("setLevel", "java.util.logging:type=Logging", true).into();
        let action = Action::jmx("setLevel", JmxImpact::Write);
        let env = Environment::standalone();

        let operator = Caller::new("o").with_role("Operator");
        let result = authorizer.authorize(&operator, &env, &action, &target);
        assert!(matches!(result.explanation(), Some(Explanation::SensitiveMBean { .. })));

        let admin = Caller::new("a").with_role("Administrator");
        assert!(authorizer.authorize(&admin, &env, &action, &target).is_permitted());
    }

    #[test]
    fn test_incremental_authorization_redacts_from_first_hidden_element() {
        let hidden = Arc::new(AccessConstraintDefinition::new(
            ConstraintKind::Sensitivity,
            ConstraintOwner::Core,
            "hidden",
        ));
        let rules = ConstraintRules::new().with_rule(
            &hidden,
            ConstraintRule::new(EffectSet::of(&[ActionEffect::Address]), ["SuperUser"]),
        );
        let authorizer = authorizer(rules);
        let caller = Caller::new("mon").with_role("Monitor");
        let address: PathAddress = "/a=1/b=2/c=3".parse().unwrap();

        let visibility = authorize_address_incrementally(
            &authorizer,
            &caller,
            &Environment::standalone(),
            &address,
            |prefix| {
                let constraints = if prefix.len() == 3 { vec![hidden.clone()] } else { vec![] };
                TargetResource::new(prefix.clone(), constraints).into()
            },
        );
        assert!(!visibility.fully_visible);
        assert_eq!(visibility.address.to_string(), "/a=1/b=2/c=<redacted>");
    }
}
