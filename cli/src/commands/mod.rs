// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the mgmt-access console

pub mod authorize;
pub mod catalog;
pub mod config;

pub use self::authorize::AuthorizeArgs;
pub use self::catalog::{CommandsArgs, TargetsArgs};
pub use self::config::ConfigCommand;
