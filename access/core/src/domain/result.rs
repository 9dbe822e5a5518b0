// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Authorization Results
//!
//! [`AuthorizationResult`] is the immutable outcome of one decision: a
//! [`Decision`] plus an optional structured [`Explanation`]. Explanations
//! name effects and constraint identities only; they never carry resource
//! data.
//!
//! [`AuthorizationResult::fail_if_denied`] converts a denial into an
//! [`AuthorizationError`]. A denial of the `address` effect always becomes
//! [`AuthorizationError::ResourceNotFound`], so an unauthorized caller cannot
//! tell a forbidden resource from a missing one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action::Action;
use super::address::PathAddress;
use super::effect::ActionEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Permit,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Explanation {
    /// The caller may not see the resource at all.
    NotAddressable,
    /// None of the caller's applicable roles grants the effect.
    EffectNotPermitted { effect: ActionEffect },
    /// A constraint bearing on the effect denied it.
    ConstraintDenied { effect: ActionEffect, constraint: String },
    /// More than one constraint bore on the effect under the rejecting policy.
    AmbiguousConstraints {
        effect: ActionEffect,
        constraints: Vec<String>,
    },
    /// A JMX call to a sensitive non-facade MBean by a non-administrative caller.
    SensitiveMBean { effect: ActionEffect },
}

impl Explanation {
    /// Configuration problems, as opposed to ordinary denials.
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::AmbiguousConstraints { .. })
    }
}

impl std::fmt::Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAddressable => write!(f, "resource is not addressable"),
            Self::EffectNotPermitted { effect } => write!(f, "{} is not permitted", effect),
            Self::ConstraintDenied { effect, constraint } => {
                write!(f, "{} denied by constraint {}", effect, constraint)
            }
            Self::AmbiguousConstraints { effect, constraints } => write!(
                f,
                "internal error: {} constraints apply to {} ({})",
                constraints.len(),
                effect,
                constraints.join(", ")
            ),
            Self::SensitiveMBean { effect } => {
                write!(f, "{} on a sensitive MBean requires an administrative role", effect)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResult {
    decision: Decision,
    explanation: Option<Explanation>,
}

impl AuthorizationResult {
    /// The shared allow-with-no-explanation result.
    pub const PERMITTED: AuthorizationResult = AuthorizationResult {
        decision: Decision::Permit,
        explanation: None,
    };

    pub fn deny(explanation: Explanation) -> Self {
        Self {
            decision: Decision::Deny,
            explanation: Some(explanation),
        }
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    pub fn is_permitted(&self) -> bool {
        self.decision == Decision::Permit
    }

    pub fn is_internal_error(&self) -> bool {
        self.explanation
            .as_ref()
            .is_some_and(Explanation::is_internal_error)
    }

    /// Raise a structured failure for `action` when this result is a denial.
    ///
    /// # Errors
    ///
    /// - [`AuthorizationError::ResourceNotFound`] when the denial is on the
    ///   `address` effect
    /// - [`AuthorizationError::Unauthorized`] for every other denial
    pub fn fail_if_denied(&self, action: &Action) -> Result<(), AuthorizationError> {
        match (&self.decision, &self.explanation) {
            (Decision::Permit, _) => Ok(()),
            (Decision::Deny, Some(Explanation::NotAddressable)) => {
                Err(AuthorizationError::ResourceNotFound {
                    address: action.address().clone(),
                })
            }
            (Decision::Deny, explanation) => Err(AuthorizationError::Unauthorized {
                operation: action.operation_name().to_string(),
                address: action.address().clone(),
                explanation: explanation.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("Operation '{operation}' at {address} is not authorized{}", explanation.as_ref().map(|e| format!(": {}", e)).unwrap_or_default())]
    Unauthorized {
        operation: String,
        address: PathAddress,
        explanation: Option<Explanation>,
    },

    #[error("Management resource {address} not found")]
    ResourceNotFound { address: PathAddress },

    #[error("Operation '{operation}' not found at {address}")]
    OperationNotFound {
        operation: String,
        address: PathAddress,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::{OperationEntry, OperationFlags};

    fn write_action() -> Action {
        Action::new(
            OperationEntry::new("add", OperationFlags::READ_WRITE),
            "/deployment=app.war".parse().unwrap(),
        )
    }

    #[test]
    fn test_permitted_is_a_noop() {
        assert!(AuthorizationResult::PERMITTED.fail_if_denied(&write_action()).is_ok());
        assert!(AuthorizationResult::PERMITTED.explanation().is_none());
    }

    #[test]
    fn test_address_denial_reports_not_found() {
        let result = AuthorizationResult::deny(Explanation::NotAddressable);
        let err = result.fail_if_denied(&write_action()).unwrap_err();
        assert!(matches!(err, AuthorizationError::ResourceNotFound { .. }));
        assert!(!err.to_string().contains("authorized"));
    }

    #[test]
    fn test_other_denials_carry_operation_address_and_explanation() {
        let result = AuthorizationResult::deny(Explanation::EffectNotPermitted {
            effect: ActionEffect::WriteConfig,
        });
        let err = result.fail_if_denied(&write_action()).unwrap_err();
        match &err {
            AuthorizationError::Unauthorized {
                operation,
                address,
                explanation,
            } => {
                assert_eq!(operation, "add");
                assert_eq!(address.to_string(), "/deployment=app.war");
                assert!(explanation.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("write-config is not permitted"));
    }

    #[test]
    fn test_ambiguity_is_an_internal_error() {
        let result = AuthorizationResult::deny(Explanation::AmbiguousConstraints {
            effect: ActionEffect::WriteConfig,
            constraints: vec!["a".into(), "b".into()],
        });
        assert!(result.is_internal_error());
        assert!(!result.is_permitted());
    }
}
