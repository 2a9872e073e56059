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

//! Authentication method selection for SSH connections.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use super::known_hosts::default_ssh_dir;
use super::tokio_client::AuthMethod;
use crate::session::Credentials;

/// Key files tried, in order, when neither a key nor a password was given.
const DEFAULT_KEY_NAMES: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

/// Everything needed to pick one authentication method for a run.
#[derive(Clone)]
pub struct AuthContext {
    pub key_path: Option<PathBuf>,
    pub use_agent: bool,
    pub password: Option<Zeroizing<String>>,
    pub username: String,
}

impl AuthContext {
    pub fn new(username: String) -> Self {
        Self {
            key_path: None,
            use_agent: false,
            password: None,
            username,
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(credentials.user.clone())
            .with_key_path(credentials.key_path.clone())
            .with_agent(credentials.use_agent)
            .with_password(credentials.password.clone())
    }

    pub fn with_key_path(mut self, key_path: Option<PathBuf>) -> Self {
        self.key_path = key_path;
        self
    }

    pub fn with_agent(mut self, use_agent: bool) -> Self {
        self.use_agent = use_agent;
        self
    }

    pub fn with_password(mut self, password: Option<Zeroizing<String>>) -> Self {
        self.password = password;
        self
    }

    /// Determine the authentication method.
    ///
    /// Priority:
    /// 1. Password, when one was supplied
    /// 2. The explicit key file
    /// 3. SSH agent, when enabled and `SSH_AUTH_SOCK` is set
    /// 4. Default key locations (`~/.ssh/id_ed25519`, `~/.ssh/id_rsa`, `~/.ssh/id_ecdsa`)
    ///
    /// Encrypted keys prompt for their passphrase on the terminal.
    pub fn determine_method(&self) -> Result<AuthMethod> {
        if let Some(password) = &self.password {
            tracing::debug!("Using password authentication");
            return Ok(AuthMethod::Password(password.clone()));
        }

        if let Some(key_path) = &self.key_path {
            return key_file_auth(key_path);
        }

        #[cfg(not(target_os = "windows"))]
        if self.use_agent {
            if std::env::var("SSH_AUTH_SOCK").is_ok() {
                tracing::debug!("Using SSH agent for authentication");
                return Ok(AuthMethod::with_agent());
            }
            tracing::debug!("SSH_AUTH_SOCK not set, skipping agent");
        }

        self.default_key_auth()
    }

    fn default_key_auth(&self) -> Result<AuthMethod> {
        if let Some(ssh_dir) = default_ssh_dir() {
            for name in DEFAULT_KEY_NAMES {
                let default_key = ssh_dir.join(name);
                if default_key.exists() {
                    tracing::debug!("Using default key: {:?}", default_key);
                    return key_file_auth(&default_key);
                }
            }
        } else {
            tracing::debug!("No home directory, skipping default keys");
        }

        anyhow::bail!(
            "No authentication method available for user '{}'. \
             Use --ask-pass, --key, or start an SSH agent (SSH agent: {})",
            self.username,
            if std::env::var("SSH_AUTH_SOCK").is_ok() {
                "available but disabled"
            } else {
                "SSH_AUTH_SOCK not set"
            }
        )
    }
}

fn key_file_auth(key_path: &Path) -> Result<AuthMethod> {
    tracing::debug!("Authenticating with key: {:?}", key_path);

    let key_contents = std::fs::read_to_string(key_path)
        .with_context(|| format!("Failed to read SSH key file: {key_path:?}"))?;

    let passphrase = if is_encrypted_key(&key_contents) {
        tracing::debug!("Detected encrypted SSH key, prompting for passphrase");
        Some(Zeroizing::new(
            rpassword::prompt_password(format!("Enter passphrase for key {key_path:?}: "))
                .with_context(|| "Failed to read passphrase")?,
        ))
    } else {
        None
    };

    Ok(AuthMethod::with_key_file(
        key_path,
        passphrase.as_ref().map(|p| p.as_str()),
    ))
}

fn is_encrypted_key(contents: &str) -> bool {
    contents.contains("ENCRYPTED") || contents.contains("Proc-Type: 4,ENCRYPTED")
}

/// Prompt once for the SSH password used against every host.
pub fn prompt_password(username: &str) -> Result<Zeroizing<String>> {
    let password = rpassword::prompt_password(format!("SSH password for {username}: "))
        .with_context(|| "Failed to read password")?;
    Ok(Zeroizing::new(password))
}
