// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Actions and the Action Classifier
//!
//! An [`Action`] is one classified management operation against one address.
//! Its effect set is derived from the operation's metadata flags by
//! [`ActionClassifier`]; callers never choose effects directly.
//!
//! | runtime-only | read-only | effects |
//! |--------------|-----------|---------|
//! | yes | no  | address, read-runtime, write-runtime |
//! | yes | yes | address, read-runtime |
//! | no  | yes | address, read-config, read-runtime |
//! | no  | no  | all five |
//!
//! An action without operation metadata carries no effects; it is used only
//! to probe address visibility through [`Action::limit_action`].

use serde::{Deserialize, Serialize};

use super::address::PathAddress;
use super::effect::{ActionEffect, EffectSet};
use super::target::JmxImpact;

/// Metadata flags describing what an operation touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationFlags {
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub runtime_only: bool,
}

impl OperationFlags {
    pub const READ_WRITE: OperationFlags = OperationFlags {
        read_only: false,
        runtime_only: false,
    };
    pub const READ_ONLY: OperationFlags = OperationFlags {
        read_only: true,
        runtime_only: false,
    };
    pub const RUNTIME_ONLY: OperationFlags = OperationFlags {
        read_only: false,
        runtime_only: true,
    };
    pub const RUNTIME_READ_ONLY: OperationFlags = OperationFlags {
        read_only: true,
        runtime_only: true,
    };
}

/// An operation registered at some resource, with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEntry {
    pub name: String,
    #[serde(flatten)]
    pub flags: OperationFlags,
}

impl OperationEntry {
    pub fn new(name: impl Into<String>, flags: OperationFlags) -> Self {
        Self {
            name: name.into(),
            flags,
        }
    }
}

/// Derives effect sets from operation metadata.
pub struct ActionClassifier;

impl ActionClassifier {
    pub fn classify(flags: Option<&OperationFlags>) -> EffectSet {
        use ActionEffect::*;

        match flags {
            None => EffectSet::empty(),
            Some(OperationFlags {
                runtime_only: true,
                read_only: false,
            }) => EffectSet::of(&[Address, ReadRuntime, WriteRuntime]),
            Some(OperationFlags {
                runtime_only: true,
                read_only: true,
            }) => EffectSet::of(&[Address, ReadRuntime]),
            Some(OperationFlags {
                runtime_only: false,
                read_only: true,
            }) => EffectSet::of(&[Address, ReadConfig, ReadRuntime]),
            Some(OperationFlags {
                runtime_only: false,
                read_only: false,
            }) => EffectSet::all(),
        }
    }

    pub fn classify_jmx(impact: JmxImpact) -> EffectSet {
        use ActionEffect::*;

        match impact {
            JmxImpact::ReadOnly => EffectSet::of(&[Address, ReadConfig, ReadRuntime]),
            JmxImpact::Write | JmxImpact::Classloading => EffectSet::all(),
        }
    }
}

/// A classified management operation against one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    operation: Option<OperationEntry>,
    address: PathAddress,
    effects: EffectSet,
}

impl Action {
    pub fn new(operation: OperationEntry, address: PathAddress) -> Self {
        let effects = ActionClassifier::classify(Some(&operation.flags));
        Self {
            operation: Some(operation),
            address,
            effects,
        }
    }

    /// An action for an operation with no known metadata. Carries no effects.
    pub fn unknown(address: PathAddress) -> Self {
        Self {
            operation: None,
            address,
            effects: EffectSet::empty(),
        }
    }

    pub fn jmx(method: impl Into<String>, impact: JmxImpact) -> Self {
        let flags = match impact {
            JmxImpact::ReadOnly => OperationFlags::READ_ONLY,
            JmxImpact::Write | JmxImpact::Classloading => OperationFlags::READ_WRITE,
        };
        Self {
            operation: Some(OperationEntry::new(method, flags)),
            address: PathAddress::root(),
            effects: ActionClassifier::classify_jmx(impact),
        }
    }

    /// A copy of this action restricted to the single `effect`.
    pub fn limit_action(&self, effect: ActionEffect) -> Action {
        Action {
            operation: self.operation.clone(),
            address: self.address.clone(),
            effects: EffectSet::of(&[effect]),
        }
    }

    pub fn operation(&self) -> Option<&OperationEntry> {
        self.operation.as_ref()
    }

    pub fn operation_name(&self) -> &str {
        self.operation
            .as_ref()
            .map(|op| op.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ActionEffect::*;

    #[test]
    fn test_runtime_read_only_yields_address_and_read_runtime() {
        let effects = ActionClassifier::classify(Some(&OperationFlags::RUNTIME_READ_ONLY));
        assert_eq!(effects, EffectSet::of(&[Address, ReadRuntime]));
    }

    #[test]
    fn test_full_read_write_yields_all_effects() {
        let effects = ActionClassifier::classify(Some(&OperationFlags::READ_WRITE));
        assert_eq!(effects, EffectSet::all());
        assert_eq!(effects.len(), 5);
    }

    #[test]
    fn test_remaining_flag_combinations() {
        assert_eq!(
            ActionClassifier::classify(Some(&OperationFlags::RUNTIME_ONLY)),
            EffectSet::of(&[Address, ReadRuntime, WriteRuntime])
        );
        assert_eq!(
            ActionClassifier::classify(Some(&OperationFlags::READ_ONLY)),
            EffectSet::of(&[Address, ReadConfig, ReadRuntime])
        );
        assert!(ActionClassifier::classify(None).is_empty());
    }

    #[test]
    fn test_limit_action_narrows_to_one_effect() {
        let action = Action::new(
            OperationEntry::new("write-attribute", OperationFlags::READ_WRITE),
            "/subsystem=logging".parse().unwrap(),
        );
        let limited = action.limit_action(ReadConfig);
        assert_eq!(limited.effects(), &EffectSet::of(&[ReadConfig]));
        assert_eq!(limited.operation_name(), "write-attribute");
        assert_eq!(action.effects().len(), 5);
    }

    #[test]
    fn test_unknown_action_has_no_effects() {
        let action = Action::unknown(PathAddress::root());
        assert!(action.effects().is_empty());
        assert_eq!(action.operation_name(), "<unknown>");
        assert_eq!(action.limit_action(Address).effects(), &EffectSet::of(&[Address]));
    }
}
