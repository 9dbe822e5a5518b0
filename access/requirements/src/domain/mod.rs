// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer of the client-side requirement engine.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Connection and remote-query contracts, requirement trees,
//!   and per-connection evaluation state

pub mod connection;
pub mod oracle;
pub mod requirement;
pub mod state;
