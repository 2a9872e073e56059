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

use anyhow::{bail, Result};

/// Commands longer than this are rejected before reaching the remote shell.
const MAX_COMMAND_LENGTH: usize = 16384;

/// Validate a command before it is sent over SSH.
///
/// Rejects empty commands, embedded NUL bytes and oversized command lines.
pub fn sanitize_command(command: &str) -> Result<String> {
    if command.trim().is_empty() {
        bail!("Empty command not allowed");
    }

    if command.len() > MAX_COMMAND_LENGTH {
        bail!(
            "Command too long: {} bytes (max: {} bytes)",
            command.len(),
            MAX_COMMAND_LENGTH
        );
    }

    if command.contains('\0') {
        bail!("Command contains null bytes");
    }

    Ok(command.to_string())
}

/// Quote `value` for a POSIX shell.
///
/// Values made only of characters the shell never interprets are returned
/// unchanged; anything else is wrapped in single quotes.
pub fn shell_quote(value: &str) -> String {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || "_-./=+:,@%".contains(c);

    if !value.is_empty() && value.chars().all(is_plain) {
        return value.to_string();
    }

    format!("'{}'", value.replace('\'', r"'\''"))
}
