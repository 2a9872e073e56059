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

//! Engine entry point tying inventory, pool and aggregation together.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::error::EngineError;
use super::host::{HostExecutor, DEFAULT_LOG_TAG};
use super::module::ModuleSpec;
use super::pool::WorkerPool;
use super::result_types::ResultSet;
use crate::inventory::Inventory;
use crate::session::{Connector, Credentials};

/// Default number of concurrent workers.
pub const DEFAULT_FORKS: usize = 5;

/// Default per-connection timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How the module is run on each host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run the module and wait for its output.
    #[default]
    Normal,
    /// Fire-and-forget. Not supported; selecting it aborts the run.
    Background,
}

/// Everything one run needs. Owned by the [`Runner`]; nothing is global.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub inventory_path: PathBuf,
    pub pattern: String,
    pub module: ModuleSpec,
    pub credentials: Credentials,
    pub forks: usize,
    pub timeout: Duration,
    pub mode: ExecutionMode,
    pub log_tag: String,
}

impl RunnerConfig {
    pub fn new(
        inventory_path: impl Into<PathBuf>,
        pattern: impl Into<String>,
        module: ModuleSpec,
        credentials: Credentials,
    ) -> Self {
        Self {
            inventory_path: inventory_path.into(),
            pattern: pattern.into(),
            module,
            credentials,
            forks: DEFAULT_FORKS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mode: ExecutionMode::Normal,
            log_tag: DEFAULT_LOG_TAG.to_string(),
        }
    }

    pub fn with_forks(mut self, forks: usize) -> Self {
        self.forks = forks;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_log_tag(mut self, log_tag: impl Into<String>) -> Self {
        self.log_tag = log_tag.into();
        self
    }
}

/// Runs one module against the hosts selected by a pattern.
pub struct Runner {
    config: RunnerConfig,
    inventory: Inventory,
    connector: Arc<dyn Connector>,
}

impl Runner {
    /// Load the inventory and prepare a run.
    ///
    /// Fails when the inventory file does not exist; no host is contacted.
    pub fn new(config: RunnerConfig, connector: Arc<dyn Connector>) -> Result<Self, EngineError> {
        let inventory = Inventory::load(&config.inventory_path)?;
        Ok(Self::with_inventory(config, inventory, connector))
    }

    /// Prepare a run over an already parsed inventory.
    pub fn with_inventory(
        config: RunnerConfig,
        inventory: Inventory,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            config,
            inventory,
            connector,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Hosts selected by the configured pattern, in inventory order.
    pub fn matched_hosts(&self) -> Vec<String> {
        self.inventory.match_hosts(&self.config.pattern)
    }

    /// Execute the module on every matched host.
    ///
    /// An empty match returns an empty [`ResultSet`] without connecting
    /// anywhere. Cancelling `cancel` aborts the run with
    /// [`EngineError::Interrupted`].
    pub async fn run(&self, cancel: &CancellationToken) -> Result<ResultSet, EngineError> {
        let hosts = self.matched_hosts();
        if hosts.is_empty() {
            tracing::info!("No hosts matched pattern '{}'", self.config.pattern);
            return Ok(ResultSet::default());
        }

        if self.config.mode == ExecutionMode::Background {
            return Err(EngineError::UnsupportedMode);
        }

        tracing::info!(
            "Running module '{}' on {} hosts (forks: {})",
            self.config.module.name,
            hosts.len(),
            self.config.forks
        );

        let executor = Arc::new(
            HostExecutor::new(
                Arc::clone(&self.connector),
                self.config.credentials.clone(),
                self.config.module.clone(),
                self.config.timeout,
            )
            .with_log_tag(self.config.log_tag.clone()),
        );

        let outcomes = WorkerPool::new(self.config.forks)
            .run(hosts, executor, cancel)
            .await?;

        let results = ResultSet::aggregate(outcomes);
        tracing::info!(
            "Run finished: {} contacted, {} dark",
            results.contacted.len(),
            results.dark.len()
        );
        Ok(results)
    }
}

/// Build a runner from `config` and execute it once.
pub async fn run(
    config: RunnerConfig,
    connector: Arc<dyn Connector>,
    cancel: &CancellationToken,
) -> Result<ResultSet, EngineError> {
    Runner::new(config, connector)?.run(cancel).await
}
