// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Audit Logger
//!
//! Emits structured audit records for access-control events.
//!
//! Denials are written at `WARN`. A hidden resource is logged with its
//! redacted address only, so the audit trail never records more than the
//! caller was allowed to learn.

use crate::domain::events::AccessEvent;
use tracing::{info, warn};

/// Writes access-control events to the structured tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessAuditLogger {}

impl AccessAuditLogger {
    pub fn new() -> Self {
        Self {}
    }

    pub fn record(&self, event: &AccessEvent) {
        match event {
            AccessEvent::AccessDenied {
                caller,
                operation,
                address,
                effect,
                reason,
                denied_at,
            } => {
                warn!(
                    caller = %caller,
                    operation = %operation,
                    address = %address,
                    effect = ?effect,
                    reason = %reason,
                    at = %denied_at,
                    "Access denied"
                );
            }
            AccessEvent::ResourceHidden {
                caller,
                operation,
                visible_address,
                hidden_at,
            } => {
                warn!(
                    caller = %caller,
                    operation = %operation,
                    address = %visible_address,
                    at = %hidden_at,
                    "Access denied: resource not addressable"
                );
            }
            AccessEvent::AmbiguousConstraints {
                caller,
                operation,
                address,
                constraints,
                detected_at,
            } => {
                warn!(
                    caller = %caller,
                    operation = %operation,
                    address = %address,
                    constraints = ?constraints,
                    at = %detected_at,
                    "Access denied: ambiguous constraint configuration"
                );
            }
            AccessEvent::ConstraintRegistered { key, registered_at } => {
                info!(constraint = %key, at = %registered_at, "Constraint registered");
            }
        }
    }
}
