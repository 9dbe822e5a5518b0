// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application layer: evaluation, enumeration, building and lifecycle of
//! requirement trees, and the console command catalog.

pub mod builder;
pub mod catalog;
pub mod connection;
pub mod enumeration;
pub mod evaluator;
pub mod registry;
