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

//! In-memory connector and session used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use fleetmod::executor::{ModuleSpec, RunnerConfig};
use fleetmod::session::{CommandOutput, Connector, Credentials, Session, SessionError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const MOCK_TMP: &str = "/tmp/fleetmod.mock";

/// How a mocked host reacts when the module runs.
#[derive(Debug, Clone)]
pub enum HostBehavior {
    /// Print `{"host": <name>, "ping": "pong"}`.
    Pong,
    /// Print the given text verbatim.
    Prints(String),
    /// Refuse the connection with the given message.
    Refuse(String),
    /// Never finish the module command.
    Hang,
}

#[derive(Default)]
struct MockState {
    behaviors: HashMap<String, HostBehavior>,
    delay: Duration,
    connects: Mutex<HashMap<String, usize>>,
    commands: Mutex<Vec<(String, String)>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setup; only valid before the connector is shared.
    pub fn with_host(mut self, host: &str, behavior: HostBehavior) -> Self {
        self.state_mut()
            .behaviors
            .insert(host.to_string(), behavior);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.state_mut().delay = delay;
        self
    }

    fn state_mut(&mut self) -> &mut MockState {
        Arc::get_mut(&mut self.state).expect("configure the mock before sharing it")
    }

    pub fn connect_count(&self, host: &str) -> usize {
        self.state
            .connects
            .lock()
            .unwrap()
            .get(host)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_connects(&self) -> usize {
        self.state.connects.lock().unwrap().values().sum()
    }

    pub fn peak_sessions(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    pub fn active_sessions(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    /// Commands run on `host`, without the remote log side channel.
    pub fn commands_for(&self, host: &str) -> Vec<String> {
        self.state
            .commands
            .lock()
            .unwrap()
            .iter()
            .filter(|(h, c)| h == host && !c.starts_with("/usr/bin/logger"))
            .map(|(_, c)| c.clone())
            .collect()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        host: &str,
        _credentials: &Credentials,
        _timeout: Duration,
    ) -> Result<Box<dyn Session>, SessionError> {
        *self
            .state
            .connects
            .lock()
            .unwrap()
            .entry(host.to_string())
            .or_default() += 1;

        let behavior = self
            .state
            .behaviors
            .get(host)
            .cloned()
            .unwrap_or(HostBehavior::Pong);

        if let HostBehavior::Refuse(message) = &behavior {
            return Err(SessionError::Connect(message.clone()));
        }

        let active = self.state.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak.fetch_max(active, Ordering::SeqCst);

        Ok(Box::new(MockSession {
            host: host.to_string(),
            behavior,
            state: Arc::clone(&self.state),
            open: true,
        }))
    }
}

struct MockSession {
    host: String,
    behavior: HostBehavior,
    state: Arc<MockState>,
    open: bool,
}

impl MockSession {
    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.state.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.release();
    }
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl Session for MockSession {
    async fn run_command(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        self.state
            .commands
            .lock()
            .unwrap()
            .push((self.host.clone(), command.to_string()));

        if command.starts_with("/usr/bin/logger")
            || command.starts_with("chmod ")
            || command.starts_with("rm -rf ")
        {
            return Ok(ok(""));
        }
        if command.starts_with("mktemp ") {
            return Ok(ok(&format!("{MOCK_TMP}\n")));
        }

        if !self.state.delay.is_zero() {
            tokio::time::sleep(self.state.delay).await;
        }

        match &self.behavior {
            HostBehavior::Pong => Ok(ok(&format!(
                r#"{{"host": "{}", "ping": "pong"}}"#,
                self.host
            ))),
            HostBehavior::Prints(text) => Ok(ok(text)),
            HostBehavior::Hang => std::future::pending::<Result<CommandOutput, SessionError>>().await,
            HostBehavior::Refuse(message) => Err(SessionError::Execution(message.clone())),
        }
    }

    async fn put_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), SessionError> {
        if !local_path.is_file() {
            return Err(SessionError::LocalFileMissing(local_path.to_path_buf()));
        }
        self.state.commands.lock().unwrap().push((
            self.host.clone(),
            format!("put {} {}", local_path.display(), remote_path),
        ));
        Ok(())
    }

    async fn close(&mut self) {
        self.release();
    }
}

/// A module directory holding an executable named `ping`.
pub fn module_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ping"), "#!/bin/sh\necho '{}'\n").unwrap();
    dir
}

/// Write `content` as an inventory file inside `dir`.
pub fn write_inventory(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("hosts");
    std::fs::write(&path, content).unwrap();
    path
}

pub fn runner_config(inventory: &Path, pattern: &str, modules: &Path) -> RunnerConfig {
    RunnerConfig::new(
        inventory,
        pattern,
        ModuleSpec::new("ping", modules).with_args("data=pong"),
        Credentials::new("root"),
    )
}
