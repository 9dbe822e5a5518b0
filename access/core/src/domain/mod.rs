// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer of the management access-control decision point.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Effects, actions, targets, constraints and their combination,
//!   authorization results, callers, and configuration

pub mod address;
pub mod effect;
pub mod action;
pub mod target;
pub mod constraint;
pub mod combination;
pub mod result;
pub mod role;
pub mod caller;
pub mod environment;
pub mod topology;
pub mod resource_model;
pub mod events;
pub mod config;
