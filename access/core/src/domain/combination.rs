// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Constraint Combination Policies
//!
//! When several constraints bear on the same effect, a [`CombinationPolicy`]
//! decides how their verdicts combine.
//!
//! - **Permissive** (default): the first permitting constraint wins and the
//!   remaining verdicts are never produced.
//! - **Rejecting**: more than one applicable constraint is a configuration
//!   ambiguity. The effect is denied with
//!   [`Explanation::AmbiguousConstraints`], whatever the individual verdicts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::constraint::ConstraintVerdict;
use super::effect::ActionEffect;
use super::result::{AuthorizationResult, Decision, Explanation};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationPolicy {
    #[default]
    Permissive,
    Rejecting,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown combination policy '{0}': expected 'permissive' or 'rejecting'")]
pub struct UnknownPolicy(pub String);

impl FromStr for CombinationPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "rejecting" => Ok(Self::Rejecting),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for CombinationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => f.write_str("permissive"),
            Self::Rejecting => f.write_str("rejecting"),
        }
    }
}

impl CombinationPolicy {
    /// Combine the verdicts of every constraint bearing on `effect`.
    ///
    /// Returns `None` when no constraint bears on the effect, leaving the
    /// decision to the caller's base role permissions.
    pub fn resolve<I>(&self, effect: ActionEffect, verdicts: I) -> Option<AuthorizationResult>
    where
        I: IntoIterator<Item = ConstraintVerdict>,
    {
        match self {
            Self::Permissive => {
                let mut first_denial = None;
                for verdict in verdicts {
                    if verdict.decision == Decision::Permit {
                        return Some(AuthorizationResult::PERMITTED);
                    }
                    first_denial.get_or_insert(verdict.constraint);
                }
                first_denial.map(|constraint| {
                    AuthorizationResult::deny(Explanation::ConstraintDenied {
                        effect,
                        constraint: constraint.to_string(),
                    })
                })
            }
            Self::Rejecting => {
                let verdicts: Vec<ConstraintVerdict> = verdicts.into_iter().collect();
                match verdicts.as_slice() {
                    [] => None,
                    [single] => Some(match single.decision {
                        Decision::Permit => AuthorizationResult::PERMITTED,
                        Decision::Deny => AuthorizationResult::deny(Explanation::ConstraintDenied {
                            effect,
                            constraint: single.constraint.to_string(),
                        }),
                    }),
                    many => {
                        let constraints: Vec<String> =
                            many.iter().map(|v| v.constraint.to_string()).collect();
                        warn!(
                            effect = %effect,
                            constraints = ?constraints,
                            "Ambiguous constraint configuration; denying"
                        );
                        Some(AuthorizationResult::deny(Explanation::AmbiguousConstraints {
                            effect,
                            constraints,
                        }))
                    }
                }
            }
        }
    }
}
