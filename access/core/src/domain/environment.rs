// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a controller manages a single server or a multi-host domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerMode {
    #[default]
    Standalone,
    Domain,
}

impl fmt::Display for ControllerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standalone => f.write_str("standalone"),
            Self::Domain => f.write_str("domain"),
        }
    }
}

/// Kind of process making the authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessType {
    Standalone,
    DomainController,
    HostController,
    Server,
}

impl ProcessType {
    pub fn controller_mode(&self) -> ControllerMode {
        match self {
            Self::Standalone => ControllerMode::Standalone,
            _ => ControllerMode::Domain,
        }
    }
}

/// Snapshot of the deciding process, fixed for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub process_type: ProcessType,
    pub local_host: Option<String>,
}

impl Environment {
    pub fn standalone() -> Self {
        Self {
            process_type: ProcessType::Standalone,
            local_host: None,
        }
    }

    pub fn domain_controller(local_host: impl Into<String>) -> Self {
        Self {
            process_type: ProcessType::DomainController,
            local_host: Some(local_host.into()),
        }
    }

    pub fn is_standalone(&self) -> bool {
        self.process_type == ProcessType::Standalone
    }
}
