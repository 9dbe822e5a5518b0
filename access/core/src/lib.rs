// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Management access-control decision point.
//!
//! Classifies management operations into effects, evaluates them against
//! role permissions and access constraints, and reports denials without
//! leaking the existence of resources the caller may not address.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Server-side authorization for the management model

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
