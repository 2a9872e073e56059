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

//! [`Connector`] and [`Session`] over russh.

use async_trait::async_trait;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::auth::AuthContext;
use super::known_hosts::{get_check_method, StrictHostKeyChecking};
use super::tokio_client::{AuthMethod, Client, Error as ClientError};
use crate::node::Node;
use crate::session::{CommandOutput, Connector, Credentials, Session, SessionError};

/// Opens authenticated SSH sessions.
///
/// The authentication method is resolved on the first connection and
/// reused for the rest of the run, so a passphrase is asked for once.
pub struct SshConnector {
    strict_mode: StrictHostKeyChecking,
    auth: OnceCell<AuthMethod>,
}

impl SshConnector {
    pub fn new(strict_mode: StrictHostKeyChecking) -> Self {
        Self {
            strict_mode,
            auth: OnceCell::new(),
        }
    }

    pub fn strict_mode(&self) -> StrictHostKeyChecking {
        self.strict_mode
    }

    async fn auth_method(&self, credentials: &Credentials) -> Result<AuthMethod, SessionError> {
        let method = self
            .auth
            .get_or_try_init(|| async {
                let context = AuthContext::from_credentials(credentials);
                tokio::task::spawn_blocking(move || context.determine_method())
                    .await
                    .map_err(|e| SessionError::Auth(e.to_string()))?
                    .map_err(|e| SessionError::Auth(format!("{e:#}")))
            })
            .await?;
        Ok(method.clone())
    }
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new(StrictHostKeyChecking::default())
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        host: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Box<dyn Session>, SessionError> {
        let node = Node::parse(host, &credentials.user, credentials.port)
            .map_err(|e| SessionError::Connect(format!("{e:#}")))?;
        let auth = self.auth_method(credentials).await?;
        let check = get_check_method(self.strict_mode);

        tracing::debug!("Connecting to {}", node);
        let client = with_timeout(
            "connect",
            timeout,
            Client::connect(&node.host, node.port, &node.username, auth, check),
        )
        .await?
        .map_err(connect_error)?;

        Ok(Box::new(SshSession {
            client: Some(client),
            timeout,
        }))
    }
}

/// One authenticated connection. Every operation is bounded by the
/// connection timeout.
pub struct SshSession {
    client: Option<Client>,
    timeout: Duration,
}

impl SshSession {
    fn client(&self) -> Result<&Client, SessionError> {
        self.client.as_ref().ok_or(SessionError::Closed)
    }
}

#[async_trait]
impl Session for SshSession {
    async fn run_command(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        let client = self.client()?;
        let result = with_timeout("command", self.timeout, client.execute(command))
            .await?
            .map_err(|e| SessionError::Execution(e.to_string()))?;

        Ok(CommandOutput {
            stdout: result.stdout,
            stderr: result.stderr,
            exit_status: result.exit_status,
        })
    }

    async fn put_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), SessionError> {
        if !local_path.is_file() {
            return Err(SessionError::LocalFileMissing(local_path.to_path_buf()));
        }

        let client = self.client()?;
        with_timeout(
            "transfer",
            self.timeout,
            client.upload_file(local_path, remote_path),
        )
        .await?
        .map_err(|e| SessionError::Transfer(e.to_string()))
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.disconnect().await {
                tracing::debug!(
                    "Disconnect from {} failed: {}",
                    client.get_connection_address(),
                    e
                );
            }
        }
    }
}

async fn with_timeout<T>(
    operation: &'static str,
    timeout: Duration,
    future: impl Future<Output = T>,
) -> Result<T, SessionError> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| SessionError::Timeout {
            operation,
            timeout,
        })
}

fn connect_error(error: ClientError) -> SessionError {
    if error.is_auth_failure() {
        SessionError::Auth(error.to_string())
    } else {
        SessionError::Connect(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_connect_error_classification() {
        assert!(matches!(
            connect_error(ClientError::PasswordWrong),
            SessionError::Auth(_)
        ));
        assert!(matches!(
            connect_error(ClientError::ServerCheckFailed),
            SessionError::Connect(_)
        ));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_session_error() {
        let result = with_timeout(
            "connect",
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;
        match result {
            Err(SessionError::Timeout { operation, timeout }) => {
                assert_eq!(operation, "connect");
                assert_eq!(timeout, Duration::from_millis(10));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_closed_session_rejects_operations() {
        let mut session = SshSession {
            client: None,
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            session.run_command("true").await,
            Err(SessionError::Closed)
        ));
        session.close().await;
        session.close().await;
    }

    #[tokio::test]
    async fn test_put_file_reports_missing_local_file() {
        let mut session = SshSession {
            client: None,
            timeout: Duration::from_secs(1),
        };
        let missing = PathBuf::from("/nonexistent/fleetmod/module");
        match session.put_file(&missing, "/tmp/x").await {
            Err(SessionError::LocalFileMissing(path)) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_host_fails_before_auth() {
        let connector = SshConnector::default();
        let creds = Credentials::new("root");
        let result = connector
            .connect("web1:notaport", &creds, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(SessionError::Connect(_))));
    }
}
