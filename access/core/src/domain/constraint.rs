// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Constraints
//!
//! An [`AccessConstraintDefinition`] names a classification that can restrict
//! access to resources or attributes: a *sensitivity* classification (e.g.
//! credentials) or an *application* classification (e.g. deployments).
//!
//! Two definitions are the same constraint when their [`ConstraintKey`]
//! (kind, core flag, owner, name) is equal, regardless of object identity.
//! The process-wide registry in
//! [`crate::infrastructure::constraint_registry`] canonicalizes them.
//!
//! A [`ConstraintRule`] is the configured behaviour behind a definition: the
//! effects it bears on and the roles it permits for those effects.
//! [`ConstraintRules`] turns a target's definitions into per-effect
//! [`ConstraintVerdict`]s that a
//! [`super::combination::CombinationPolicy`] resolves.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::effect::{ActionEffect, EffectSet};
use super::result::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    Sensitivity,
    Application,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensitivity => f.write_str("sensitivity-classification"),
            Self::Application => f.write_str("application-classification"),
        }
    }
}

/// Who contributed a constraint definition: the core model or a subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConstraintOwner {
    #[default]
    Core,
    Subsystem(String),
}

impl ConstraintOwner {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Core => "core",
            Self::Subsystem(name) => name,
        }
    }
}

impl From<String> for ConstraintOwner {
    fn from(value: String) -> Self {
        if value == "core" {
            Self::Core
        } else {
            Self::Subsystem(value)
        }
    }
}

impl From<ConstraintOwner> for String {
    fn from(owner: ConstraintOwner) -> Self {
        owner.as_str().to_string()
    }
}

/// Identity of a constraint definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConstraintKey {
    pub kind: ConstraintKind,
    pub core: bool,
    pub owner: String,
    pub name: String,
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.owner, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConstraintDefinition {
    kind: ConstraintKind,
    owner: ConstraintOwner,
    name: String,
    description: Option<String>,
}

impl AccessConstraintDefinition {
    pub fn new(kind: ConstraintKind, owner: ConstraintOwner, name: impl Into<String>) -> Self {
        Self {
            kind,
            owner,
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn key(&self) -> ConstraintKey {
        ConstraintKey {
            kind: self.kind,
            core: self.is_core(),
            owner: self.owner.as_str().to_string(),
            name: self.name.clone(),
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn owner(&self) -> &ConstraintOwner {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_core(&self) -> bool {
        self.owner == ConstraintOwner::Core
    }
}

// Equality is by key; the description is informational.
impl PartialEq for AccessConstraintDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for AccessConstraintDefinition {}

impl Hash for AccessConstraintDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Configured behaviour of one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintRule {
    effects: EffectSet,
    permitted_roles: BTreeSet<String>,
}

impl ConstraintRule {
    pub fn new<I, S>(effects: EffectSet, permitted_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            effects,
            permitted_roles: permitted_roles
                .into_iter()
                .map(|r| r.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn bears_on(&self, effect: ActionEffect) -> bool {
        self.effects.contains(effect)
    }

    /// Permit if any of `roles` is permitted by this rule.
    pub fn decide(&self, roles: &[&str]) -> Decision {
        let permitted = roles
            .iter()
            .any(|role| self.permitted_roles.contains(&role.to_ascii_lowercase()));
        if permitted {
            Decision::Permit
        } else {
            Decision::Deny
        }
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    pub fn permitted_roles(&self) -> &BTreeSet<String> {
        &self.permitted_roles
    }
}

/// One constraint's decision for one effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintVerdict {
    pub constraint: ConstraintKey,
    pub decision: Decision,
}

/// Rules for every configured constraint, keyed by definition identity.
#[derive(Debug, Clone, Default)]
pub struct ConstraintRules {
    rules: HashMap<ConstraintKey, ConstraintRule>,
}

impl ConstraintRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: &AccessConstraintDefinition, rule: ConstraintRule) {
        self.rules.insert(definition.key(), rule);
    }

    pub fn with_rule(mut self, definition: &AccessConstraintDefinition, rule: ConstraintRule) -> Self {
        self.insert(definition, rule);
        self
    }

    pub fn get(&self, key: &ConstraintKey) -> Option<&ConstraintRule> {
        self.rules.get(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Lazily yields a verdict for each definition whose rule bears on `effect`.
    ///
    /// Definitions without a configured rule never bear on any effect.
    pub fn verdicts<'a, I>(
        &'a self,
        definitions: I,
        roles: &'a [&'a str],
        effect: ActionEffect,
    ) -> impl Iterator<Item = ConstraintVerdict> + 'a
    where
        I: IntoIterator<Item = &'a Arc<AccessConstraintDefinition>> + 'a,
        I::IntoIter: 'a,
    {
        definitions.into_iter().filter_map(move |definition| {
            let key = definition.key();
            let rule = self.rules.get(&key)?;
            if !rule.bears_on(effect) {
                return None;
            }
            Some(ConstraintVerdict {
                decision: rule.decide(roles),
                constraint: key,
            })
        })
    }
}
