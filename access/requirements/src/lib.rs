// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Client-side capability requirements.
//!
//! A console declares, per command and option, what the connected identity
//! must be allowed to do for the capability to be offered. Requirements are
//! evaluated lazily against a connection, memoized until the connection is
//! lost, and enumerate domain topology (hosts, servers, server groups) at
//! most once per connection.
//!
//! # Architecture
//!
//! - **Layer:** Client
//! - **Purpose:** Gate console capabilities on remote authorization checks

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::builder::{BuilderError, RequirementBuilder};
pub use application::catalog::{CommandCatalog, CommandTargets};
pub use application::connection::ManagedConnection;
pub use application::registry::RequirementRegistry;
pub use domain::connection::{Connection, ConnectionId, DisconnectListener};
pub use domain::oracle::{Enumerator, Oracle, QueryError};
pub use domain::requirement::{Requirement, RequirementId, RequirementKind};
pub use infrastructure::local_controller::LocalController;
