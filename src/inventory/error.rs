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

//! Error types for inventory loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading an inventory file
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The inventory path does not exist
    #[error("Unable to continue, inventory file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The inventory exists but could not be read
    #[error("failed to read inventory '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InventoryError::NotFound {
            path: PathBuf::from("/etc/fleetmod/hosts"),
        };
        assert_eq!(
            err.to_string(),
            "Unable to continue, inventory file not found: /etc/fleetmod/hosts"
        );
    }
}
