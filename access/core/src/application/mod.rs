// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application layer: the authorizer contract and the services built on it.

pub mod authorizer;
pub mod access_service;
pub mod model;
