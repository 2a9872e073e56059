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

//! Built-in defaults and precedence between flags and the config file.

use std::path::{Path, PathBuf};

use super::types::Config;
use super::utils::expand_tilde;
use crate::executor::{DEFAULT_FORKS, DEFAULT_LOG_TAG, DEFAULT_TIMEOUT_SECS};
use crate::session::DEFAULT_PORT;
use crate::ssh::StrictHostKeyChecking;

pub const DEFAULT_INVENTORY: &str = "/etc/fleetmod/hosts";
pub const DEFAULT_MODULE_PATH: &str = "/usr/share/fleetmod";
pub const DEFAULT_MODULE_NAME: &str = "ping";
pub const DEFAULT_USER: &str = "root";

// Each resolver takes the command-line value first, then the config file,
// then the built-in default.
impl Config {
    pub fn inventory(&self, cli: Option<&Path>) -> PathBuf {
        let path = cli
            .map(Path::to_path_buf)
            .or_else(|| self.defaults.inventory.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INVENTORY));
        expand_tilde(&path)
    }

    pub fn module_path(&self, cli: Option<&Path>) -> PathBuf {
        let path = cli
            .map(Path::to_path_buf)
            .or_else(|| self.defaults.module_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODULE_PATH));
        expand_tilde(&path)
    }

    pub fn module_name(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.defaults.module_name.clone())
            .unwrap_or_else(|| DEFAULT_MODULE_NAME.to_string())
    }

    pub fn module_args(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.defaults.module_args.clone())
            .unwrap_or_default()
    }

    pub fn user(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.defaults.user.clone())
            .unwrap_or_else(|| DEFAULT_USER.to_string())
    }

    pub fn port(&self, cli: Option<u16>) -> u16 {
        cli.or(self.defaults.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn forks(&self, cli: Option<usize>) -> usize {
        cli.or(self.defaults.forks).unwrap_or(DEFAULT_FORKS)
    }

    pub fn timeout(&self, cli: Option<u64>) -> u64 {
        cli.or(self.defaults.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn ssh_key(&self, cli: Option<&Path>) -> Option<PathBuf> {
        cli.map(Path::to_path_buf)
            .or_else(|| self.defaults.ssh_key.as_ref().map(PathBuf::from))
            .map(|path| expand_tilde(&path))
    }

    /// A `--use-agent` flag can only switch the agent on.
    pub fn use_agent(&self, cli: bool) -> bool {
        cli || self.defaults.use_agent.unwrap_or(true)
    }

    pub fn strict_host_key_checking(
        &self,
        cli: Option<StrictHostKeyChecking>,
    ) -> StrictHostKeyChecking {
        cli.or(self.defaults.strict_host_key_checking)
            .unwrap_or_default()
    }

    pub fn log_tag(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.defaults.log_tag.clone())
            .unwrap_or_else(|| DEFAULT_LOG_TAG.to_string())
    }
}
