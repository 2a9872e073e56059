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

use std::io;

/// Errors raised by the SSH client.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Address is invalid: {0}")]
    AddressInvalid(io::Error),
    #[error("The key is invalid or was rejected by the server")]
    KeyAuthFailed,
    #[error("Unable to load key, bad format or passphrase: {0}")]
    KeyInvalid(russh::keys::Error),
    #[error("Wrong password")]
    PasswordWrong,
    #[error("Server host key verification failed")]
    ServerCheckFailed,
    #[error("SSH agent is not reachable (is SSH_AUTH_SOCK set?)")]
    AgentConnectionFailed,
    #[error("Failed to list identities from the SSH agent")]
    AgentRequestIdentitiesFailed,
    #[error("The SSH agent holds no identities")]
    AgentNoIdentities,
    #[error("No SSH agent identity was accepted by the server")]
    AgentAuthenticationFailed,
    #[error("Command validation failed: {0}")]
    CommandValidationFailed(String),
    #[error("Remote command terminated without reporting an exit status")]
    CommandDidntExit,
    #[error("SSH error: {0}")]
    SshError(#[from] russh::Error),
    #[error("SFTP error: {0}")]
    SftpError(#[from] russh_sftp::client::error::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// True for failures that happened while proving the client's identity.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::KeyAuthFailed
                | Self::KeyInvalid(_)
                | Self::PasswordWrong
                | Self::AgentConnectionFailed
                | Self::AgentRequestIdentitiesFailed
                | Self::AgentNoIdentities
                | Self::AgentAuthenticationFailed
        )
    }
}
