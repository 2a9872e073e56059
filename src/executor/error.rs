// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for the execution engine.

use std::path::PathBuf;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::session::SessionError;

/// Failure of one host's protocol run.
///
/// These never escape the engine: they are rendered into the host's `dark`
/// diagnostic and sibling hosts keep running.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("connect error: {0}")]
    Connect(#[source] SessionError),

    #[error("failed to stage remote temporary directory: {0}")]
    Staging(String),

    #[error("{0} is not a module")]
    NotAModule(String),

    #[error("module not found: {}", .0.display())]
    ModuleNotFound(PathBuf),

    #[error("failed to transfer module: {0}")]
    Transfer(#[source] SessionError),

    #[error("execution error: {0}")]
    Execution(#[source] SessionError),
}

/// Run-level failures. Any of these aborts the whole run and no result set
/// is produced.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("background (async) module execution is unsupported")]
    UnsupportedMode,

    #[error("run interrupted before all hosts completed")]
    Interrupted,

    #[error("worker task failed: {0}")]
    WorkerFailed(String),
}

impl EngineError {
    /// True when the inventory file does not exist.
    pub fn is_inventory_not_found(&self) -> bool {
        matches!(self, Self::Inventory(InventoryError::NotFound { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_messages() {
        let err = HostError::Connect(SessionError::Connect("No route to host".to_string()));
        assert_eq!(err.to_string(), "connect error: No route to host");

        let err = HostError::NotAModule("/bin/sh".to_string());
        assert_eq!(err.to_string(), "/bin/sh is not a module");
    }

    #[test]
    fn test_inventory_not_found_detection() {
        let err = EngineError::from(InventoryError::NotFound {
            path: PathBuf::from("missing"),
        });
        assert!(err.is_inventory_not_found());
        assert!(!EngineError::Interrupted.is_inventory_not_found());
    }
}
