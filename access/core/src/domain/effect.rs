// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Action Effects
//!
//! The fixed vocabulary of ways a management action can affect a resource.
//! Authorization decisions are made per effect; an [`EffectSet`] is iterated
//! in declaration order, so `Address` is always considered first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionEffect {
    /// The resource's existence is visible to the caller.
    Address,
    ReadConfig,
    ReadRuntime,
    WriteConfig,
    WriteRuntime,
}

impl ActionEffect {
    pub const ALL: [ActionEffect; 5] = [
        ActionEffect::Address,
        ActionEffect::ReadConfig,
        ActionEffect::ReadRuntime,
        ActionEffect::WriteConfig,
        ActionEffect::WriteRuntime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::ReadConfig => "read-config",
            Self::ReadRuntime => "read-runtime",
            Self::WriteConfig => "write-config",
            Self::WriteRuntime => "write-runtime",
        }
    }

    /// `Address` and the two read effects.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Address | Self::ReadConfig | Self::ReadRuntime)
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::WriteConfig | Self::WriteRuntime)
    }
}

impl fmt::Display for ActionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown action effect '{0}'")]
pub struct UnknownEffect(pub String);

impl FromStr for ActionEffect {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ActionEffect::ALL
            .into_iter()
            .find(|effect| effect.as_str() == normalized)
            .ok_or_else(|| UnknownEffect(s.to_string()))
    }
}

/// Ordered set of [`ActionEffect`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectSet(BTreeSet<ActionEffect>);

impl EffectSet {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn all() -> Self {
        ActionEffect::ALL.into_iter().collect()
    }

    pub fn of(effects: &[ActionEffect]) -> Self {
        effects.iter().copied().collect()
    }

    pub fn contains(&self, effect: ActionEffect) -> bool {
        self.0.contains(&effect)
    }

    pub fn insert(&mut self, effect: ActionEffect) -> bool {
        self.0.insert(effect)
    }

    pub fn iter(&self) -> impl Iterator<Item = ActionEffect> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_subset(&self, other: &EffectSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn union(&self, other: &EffectSet) -> EffectSet {
        self.0.union(&other.0).copied().collect()
    }
}

impl FromIterator<ActionEffect> for EffectSet {
    fn from_iter<T: IntoIterator<Item = ActionEffect>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for EffectSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(ActionEffect::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_parsing_accepts_both_spellings() {
        assert_eq!("read-config".parse::<ActionEffect>().unwrap(), ActionEffect::ReadConfig);
        assert_eq!("WRITE_RUNTIME".parse::<ActionEffect>().unwrap(), ActionEffect::WriteRuntime);
        assert!("delete".parse::<ActionEffect>().is_err());
    }

    #[test]
    fn test_effect_set_iterates_address_first() {
        let set = EffectSet::of(&[ActionEffect::WriteConfig, ActionEffect::Address]);
        let order: Vec<ActionEffect> = set.iter().collect();
        assert_eq!(order, vec![ActionEffect::Address, ActionEffect::WriteConfig]);
        assert_eq!(set.to_string(), "{address, write-config}");
    }

    #[test]
    fn test_effect_set_serde_is_a_plain_list() {
        let set: EffectSet = serde_yaml::from_str("[address, read-runtime]").unwrap();
        assert_eq!(set, EffectSet::of(&[ActionEffect::Address, ActionEffect::ReadRuntime]));
    }
}
