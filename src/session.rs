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

//! Remote session capability consumed by the execution engine.
//!
//! The engine never talks to a transport directly. It asks a [`Connector`]
//! for a [`Session`] per host and drives it through four operations:
//! connect, run a command, put a file and close. The SSH implementation
//! lives in [`crate::ssh`]; tests substitute an in-memory one.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use zeroize::Zeroizing;

/// Default SSH port used when a host does not carry one.
pub const DEFAULT_PORT: u16 = 22;

/// Engine-wide login settings shared by every connection of a run.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub port: u16,
    pub password: Option<Zeroizing<String>>,
    pub key_path: Option<PathBuf>,
    pub use_agent: bool,
}

impl Credentials {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            port: DEFAULT_PORT,
            password: None,
            key_path: None,
            use_agent: true,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_password(mut self, password: Option<Zeroizing<String>>) -> Self {
        self.password = password;
        self
    }

    pub fn with_key_path(mut self, key_path: Option<PathBuf>) -> Self {
        self.key_path = key_path;
        self
    }

    pub fn with_agent(mut self, use_agent: bool) -> Self {
        self.use_agent = use_agent;
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("key_path", &self.key_path)
            .field("use_agent", &self.use_agent)
            .finish()
    }
}

/// Captured output of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u32,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Failures reported by a session implementation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Connect(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("{0}")]
    Execution(String),

    #[error("{0}")]
    Transfer(String),

    #[error("file or module does not exist: {}", .0.display())]
    LocalFileMissing(PathBuf),

    #[error("session is closed")]
    Closed,
}

/// Opens sessions to hosts. Shared by all workers of a run.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and authenticate to `host`.
    ///
    /// `timeout` bounds connection establishment and every later operation
    /// on the returned session.
    async fn connect(
        &self,
        host: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Box<dyn Session>, SessionError>;
}

/// A connected remote endpoint, owned by exactly one job.
#[async_trait]
pub trait Session: Send {
    /// Run a shell command and capture its output.
    async fn run_command(&mut self, command: &str) -> Result<CommandOutput, SessionError>;

    /// Copy a local file to `remote_path`.
    async fn put_file(&mut self, local_path: &Path, remote_path: &str)
        -> Result<(), SessionError>;

    /// Release the connection. Calling it again is a no-op.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("root")
            .with_password(Some(Zeroizing::new("hunter2".to_string())));
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_credentials_defaults() {
        let creds = Credentials::new("admin");
        assert_eq!(creds.port, DEFAULT_PORT);
        assert!(creds.use_agent);
        assert!(creds.password.is_none());
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::Timeout {
            operation: "connect",
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "connect timed out after 10s");

        let err = SessionError::Timeout {
            operation: "command",
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "command timed out after 250ms");

        let err = SessionError::LocalFileMissing(PathBuf::from("/usr/share/fleetmod/ping"));
        assert_eq!(
            err.to_string(),
            "file or module does not exist: /usr/share/fleetmod/ping"
        );
    }
}
