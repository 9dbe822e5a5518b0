// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Roles and Base Permissions
//!
//! The standard role ladder and the effects each role may exercise when no
//! constraint bears on an effect. Role names are case-insensitive.

use std::collections::BTreeMap;
use std::fmt;

use super::effect::{ActionEffect, EffectSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardRole {
    Monitor,
    Operator,
    Maintainer,
    Deployer,
    Administrator,
    Auditor,
    SuperUser,
}

impl StandardRole {
    pub const ALL: [StandardRole; 7] = [
        StandardRole::Monitor,
        StandardRole::Operator,
        StandardRole::Maintainer,
        StandardRole::Deployer,
        StandardRole::Administrator,
        StandardRole::Auditor,
        StandardRole::SuperUser,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Monitor => "Monitor",
            Self::Operator => "Operator",
            Self::Maintainer => "Maintainer",
            Self::Deployer => "Deployer",
            Self::Administrator => "Administrator",
            Self::Auditor => "Auditor",
            Self::SuperUser => "SuperUser",
        }
    }

    pub fn default_effects(&self) -> EffectSet {
        use ActionEffect::*;

        match self {
            Self::Monitor | Self::Auditor | Self::Deployer => {
                EffectSet::of(&[Address, ReadConfig, ReadRuntime])
            }
            Self::Operator => EffectSet::of(&[Address, ReadConfig, ReadRuntime, WriteRuntime]),
            Self::Maintainer | Self::Administrator | Self::SuperUser => EffectSet::all(),
        }
    }
}

impl fmt::Display for StandardRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role name (lowercased) to permitted effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePermissions {
    roles: BTreeMap<String, EffectSet>,
}

impl RolePermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut permissions = Self::new();
        for role in StandardRole::ALL {
            permissions.insert(role.name(), role.default_effects());
        }
        permissions
    }

    pub fn insert(&mut self, role: &str, effects: EffectSet) {
        self.roles.insert(role.to_ascii_lowercase(), effects);
    }

    pub fn effects_of(&self, role: &str) -> Option<&EffectSet> {
        self.roles.get(&role.to_ascii_lowercase())
    }

    pub fn grants(&self, role: &str, effect: ActionEffect) -> bool {
        self.effects_of(role).is_some_and(|effects| effects.contains(effect))
    }

    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains_key(&role.to_ascii_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }
}
