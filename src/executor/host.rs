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

//! Single-host protocol: connect, stage a temporary workspace, transfer and
//! run the module, decode its output, clean up and disconnect.
//!
//! Steps run strictly in order. A failure at any step ends the host's run
//! with a `dark` outcome; cleanup and close are still attempted for whatever
//! was already set up.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::HostError;
use super::module::{decode_output, ModuleSpec};
use super::result_types::{HostOutcome, OutcomeStatus};
use crate::session::{CommandOutput, Connector, Credentials, Session, SessionError};
use crate::utils::shell_quote;

/// Remote command creating the per-run workspace.
pub const MKTEMP_COMMAND: &str = "mktemp -d /tmp/fleetmod.XXXXXXXX";

/// Default tag for the remote syslog side channel.
pub const DEFAULT_LOG_TAG: &str = "fleetmod";

/// Protocol progress of one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStage {
    Connecting,
    TempStaged,
    ModuleTransferred,
    Executed,
    Cleaned,
    Closed,
}

impl fmt::Display for ProtocolStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::TempStaged => "temp-staged",
            Self::ModuleTransferred => "module-transferred",
            Self::Executed => "executed",
            Self::Cleaned => "cleaned",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Runs the module protocol against one host at a time.
///
/// One executor is shared by all workers of a run; each call to
/// [`HostExecutor::execute`] owns its own session.
pub struct HostExecutor {
    connector: Arc<dyn Connector>,
    credentials: Credentials,
    module: ModuleSpec,
    timeout: Duration,
    log_tag: String,
}

impl HostExecutor {
    pub fn new(
        connector: Arc<dyn Connector>,
        credentials: Credentials,
        module: ModuleSpec,
        timeout: Duration,
    ) -> Self {
        Self {
            connector,
            credentials,
            module,
            timeout,
            log_tag: DEFAULT_LOG_TAG.to_string(),
        }
    }

    /// Set the tag used for the remote syslog side channel.
    pub fn with_log_tag(mut self, log_tag: impl Into<String>) -> Self {
        self.log_tag = log_tag.into();
        self
    }

    pub fn module(&self) -> &ModuleSpec {
        &self.module
    }

    /// Run the full protocol against `host`. Never fails: every error is
    /// folded into a `dark` outcome.
    pub async fn execute(&self, host: &str) -> HostOutcome {
        tracing::debug!("[{}] {}", host, ProtocolStage::Connecting);

        let mut session = match self
            .connector
            .connect(host, &self.credentials, self.timeout)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                let err = HostError::Connect(e);
                tracing::warn!("[{}] {}", host, err);
                return HostOutcome::dark(host, err.to_string());
            }
        };

        let status = self.run_on_session(host, session.as_mut()).await;

        session.close().await;
        tracing::debug!("[{}] {}", host, ProtocolStage::Closed);

        HostOutcome {
            host: host.to_string(),
            status,
        }
    }

    async fn run_on_session(&self, host: &str, session: &mut dyn Session) -> OutcomeStatus {
        let tmp = match self.stage_workspace(session).await {
            Ok(tmp) => tmp,
            Err(e) => {
                tracing::warn!("[{}] {}", host, e);
                return OutcomeStatus::Dark(e.to_string());
            }
        };
        tracing::debug!("[{}] {}: {}", host, ProtocolStage::TempStaged, tmp);

        let result = self.transfer_and_run(host, session, &tmp).await;

        self.remove_workspace(host, session, &tmp).await;

        match result {
            Ok(output) => {
                if !output.is_success() {
                    tracing::debug!(
                        "[{}] module exited with status {}",
                        host,
                        output.exit_status
                    );
                }
                decode_output(&output.stdout).into()
            }
            Err(e) => {
                tracing::warn!("[{}] {}", host, e);
                OutcomeStatus::Dark(e.to_string())
            }
        }
    }

    async fn transfer_and_run(
        &self,
        host: &str,
        session: &mut dyn Session,
        tmp: &str,
    ) -> Result<CommandOutput, HostError> {
        let remote = self.transfer_module(session, tmp).await?;
        tracing::debug!("[{}] {}: {}", host, ProtocolStage::ModuleTransferred, remote);

        let command = self.module.command_line(&remote);
        let output = self
            .exec_command(session, &command)
            .await
            .map_err(HostError::Execution)?;
        tracing::debug!("[{}] {}", host, ProtocolStage::Executed);

        Ok(output)
    }

    /// Create the remote workspace and return its path with a trailing `/`.
    async fn stage_workspace(&self, session: &mut dyn Session) -> Result<String, HostError> {
        let output = self
            .exec_command(session, MKTEMP_COMMAND)
            .await
            .map_err(|e| HostError::Staging(e.to_string()))?;

        let first_line = output.stdout.lines().next().unwrap_or("").trim();
        if first_line.is_empty() {
            let detail = output.stderr.trim();
            return Err(HostError::Staging(if detail.is_empty() {
                format!("mktemp returned no path (exit status {})", output.exit_status)
            } else {
                detail.to_string()
            }));
        }

        Ok(format!("{first_line}/"))
    }

    /// Copy the module into the workspace and mark it executable.
    async fn transfer_module(
        &self,
        session: &mut dyn Session,
        tmp: &str,
    ) -> Result<String, HostError> {
        let local = self.module.local_path()?;
        let remote = self.module.remote_path(tmp);

        session
            .put_file(&local, &remote)
            .await
            .map_err(|e| match e {
                SessionError::LocalFileMissing(path) => HostError::ModuleNotFound(path),
                other => HostError::Transfer(other),
            })?;

        let chmod = self
            .exec_command(session, &format!("chmod +x {}", shell_quote(&remote)))
            .await
            .map_err(HostError::Transfer)?;
        if !chmod.is_success() {
            return Err(HostError::Transfer(SessionError::Execution(format!(
                "chmod exited with status {}: {}",
                chmod.exit_status,
                chmod.stderr.trim()
            ))));
        }

        Ok(remote)
    }

    /// Best effort: a failure here does not change the computed outcome.
    async fn remove_workspace(&self, host: &str, session: &mut dyn Session, tmp: &str) {
        match self
            .exec_command(session, &format!("rm -rf {}", shell_quote(tmp)))
            .await
        {
            Ok(_) => tracing::debug!("[{}] {}", host, ProtocolStage::Cleaned),
            Err(e) => tracing::debug!("[{}] cleanup of {} failed: {}", host, tmp, e),
        }
    }

    /// Mirror `command` to the remote syslog, then run it.
    async fn exec_command(
        &self,
        session: &mut dyn Session,
        command: &str,
    ) -> Result<CommandOutput, SessionError> {
        self.remote_log(session, command).await;
        session.run_command(command).await
    }

    async fn remote_log(&self, session: &mut dyn Session, command: &str) {
        let message = format!("{}:{}", self.module.name, command);
        let log_command = format!(
            "/usr/bin/logger -t {} -p auth.info {}",
            shell_quote(&self.log_tag),
            shell_quote(&message)
        );
        if let Err(e) = session.run_command(&log_command).await {
            tracing::debug!("remote log failed: {}", e);
        }
    }
}
