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

//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::ssh::StrictHostKeyChecking;

/// Main configuration structure.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Settings applied when the matching command-line flag is absent.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Inventory file path. `~` is expanded.
    pub inventory: Option<String>,
    /// Local directory holding module executables.
    pub module_path: Option<String>,
    pub module_name: Option<String>,
    /// Argument line handed to the module, split on whitespace.
    pub module_args: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    /// Number of concurrent workers.
    pub forks: Option<usize>,
    /// Per-connection timeout in seconds.
    pub timeout: Option<u64>,
    pub ssh_key: Option<String>,
    pub use_agent: Option<bool>,
    pub strict_host_key_checking: Option<StrictHostKeyChecking>,
    /// Tag used for the remote syslog side channel.
    pub log_tag: Option<String>,
}
