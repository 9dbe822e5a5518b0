// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::address::PathAddress;
use super::effect::ActionEffect;

/// Access-control audit events.
///
/// Denials of the `address` effect are recorded as [`AccessEvent::ResourceHidden`]
/// and never carry the explanation, mirroring what the caller is told.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccessEvent {
    AccessDenied {
        caller: String,
        operation: String,
        address: PathAddress,
        effect: Option<ActionEffect>,
        reason: String,
        denied_at: DateTime<Utc>,
    },
    ResourceHidden {
        caller: String,
        operation: String,
        /// Address with every element the caller may not see redacted.
        visible_address: PathAddress,
        hidden_at: DateTime<Utc>,
    },
    AmbiguousConstraints {
        caller: String,
        operation: String,
        address: PathAddress,
        constraints: Vec<String>,
        detected_at: DateTime<Utc>,
    },
    ConstraintRegistered {
        key: String,
        registered_at: DateTime<Utc>,
    },
}
