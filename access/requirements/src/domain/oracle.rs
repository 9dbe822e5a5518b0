// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Remote query contracts answered by a management controller.
//!
//! Both calls may block on network I/O. Timeouts and cancellation belong to
//! the implementation; the evaluator never retries.

use async_trait::async_trait;
use mgmt_access_core::domain::address::PathAddress;
use thiserror::Error;

/// Failure of a remote query. The evaluator treats every variant as a denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Response is missing required field '{0}'")]
    MissingField(String),

    #[error("No {node_type} children under unknown node {address}")]
    UnknownNode {
        address: PathAddress,
        node_type: String,
    },
}

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Whether the connected identity may execute `operation` at `address`,
    /// probed as if under the `scope` prefix (e.g. `/host=a/server=s1`).
    async fn is_executable(
        &self,
        scope: &PathAddress,
        address: &PathAddress,
        operation: &str,
    ) -> Result<bool, QueryError>;
}

#[async_trait]
pub trait Enumerator: Send + Sync {
    /// Names of the `node_type` children of `parent`, in topology order.
    async fn list_child_names(
        &self,
        parent: &PathAddress,
        node_type: &str,
    ) -> Result<Vec<String>, QueryError>;
}
