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

//! Module description, remote command rendering and output decoding.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::error::HostError;
use crate::utils::shell_quote;

/// Arguments passed to a module on its command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleArgs {
    /// Passed through verbatim.
    Line(String),
    /// Joined with single spaces.
    List(Vec<String>),
}

impl ModuleArgs {
    pub fn render(&self) -> String {
        match self {
            Self::Line(line) => line.clone(),
            Self::List(items) => items.join(" "),
        }
    }
}

impl Default for ModuleArgs {
    fn default() -> Self {
        Self::Line(String::new())
    }
}

impl From<&str> for ModuleArgs {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for ModuleArgs {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl From<Vec<String>> for ModuleArgs {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// The module to run: an executable named `name` inside the local `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub name: String,
    pub path: PathBuf,
    pub args: ModuleArgs,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            args: ModuleArgs::default(),
        }
    }

    pub fn with_args(mut self, args: impl Into<ModuleArgs>) -> Self {
        self.args = args.into();
        self
    }

    /// Resolve the module executable on the controlling side.
    pub fn local_path(&self) -> Result<PathBuf, HostError> {
        if self.name.is_empty() || Path::new(&self.name).is_absolute() {
            return Err(HostError::NotAModule(self.name.clone()));
        }
        let local = self.path.join(&self.name);
        if !local.is_file() {
            return Err(HostError::ModuleNotFound(local));
        }
        Ok(local)
    }

    /// Where the module is copied inside a staged workspace (`tmp` ends in `/`).
    pub fn remote_path(&self, tmp: &str) -> String {
        format!("{tmp}{}", self.name)
    }

    /// Command line invoking the remote copy with this module's arguments.
    pub fn command_line(&self, remote_path: &str) -> String {
        let args = self.args.render();
        if args.is_empty() {
            shell_quote(remote_path)
        } else {
            format!("{} {args}", shell_quote(remote_path))
        }
    }
}

/// Structured payload printed by a module.
pub type Payload = Map<String, Value>;

/// What a module printed, decoded once.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleOutput {
    /// A JSON object.
    Decoded(Payload),
    /// Anything else, kept verbatim with the reason decoding failed.
    Raw { error: String, text: String },
}

impl ModuleOutput {
    /// Diagnostic for undecodable output: `<decode-error>/<raw output>`.
    pub fn diagnostic(error: &str, text: &str) -> String {
        format!("{error}/{text}")
    }
}

/// Decode module output into a key/value payload.
pub fn decode_output(text: &str) -> ModuleOutput {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(payload)) => ModuleOutput::Decoded(payload),
        Ok(other) => ModuleOutput::Raw {
            error: format!("expected a JSON object, got {}", json_kind(&other)),
            text: text.to_string(),
        },
        Err(e) => ModuleOutput::Raw {
            error: e.to_string(),
            text: text.to_string(),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_args_rendering() {
        assert_eq!(ModuleArgs::from("a=1  b=2").render(), "a=1  b=2");
        assert_eq!(
            ModuleArgs::from(vec!["a=1".to_string(), "b=2".to_string()]).render(),
            "a=1 b=2"
        );
        assert_eq!(ModuleArgs::default().render(), "");
    }

    #[test]
    fn test_command_line() {
        let spec = ModuleSpec::new("ping", "/usr/share/fleetmod");
        assert_eq!(spec.command_line("/tmp/x/ping"), "/tmp/x/ping");

        let spec = spec.with_args(vec!["data=pong".to_string(), "-v".to_string()]);
        assert_eq!(spec.command_line("/tmp/x/ping"), "/tmp/x/ping data=pong -v");
    }

    #[test]
    fn test_remote_path() {
        let spec = ModuleSpec::new("setup", "/modules");
        assert_eq!(spec.remote_path("/tmp/fleetmod.abc/"), "/tmp/fleetmod.abc/setup");
    }

    #[test]
    fn test_local_path_resolution() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("ping"), "#!/bin/sh\n").unwrap();

        let spec = ModuleSpec::new("ping", temp_dir.path());
        assert_eq!(spec.local_path().unwrap(), temp_dir.path().join("ping"));

        let missing = ModuleSpec::new("nope", temp_dir.path());
        assert!(matches!(
            missing.local_path(),
            Err(HostError::ModuleNotFound(_))
        ));
    }

    #[test]
    fn test_absolute_module_name_rejected() {
        let spec = ModuleSpec::new("/bin/sh", "/usr/share/fleetmod");
        assert!(matches!(spec.local_path(), Err(HostError::NotAModule(_))));
    }

    #[test]
    fn test_decode_object() {
        match decode_output("{\"ping\": \"pong\"}\n") {
            ModuleOutput::Decoded(payload) => {
                assert_eq!(payload.get("ping"), Some(&Value::from("pong")));
            }
            other => panic!("Expected decoded payload, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_plain_text_keeps_raw() {
        match decode_output("plain text") {
            ModuleOutput::Raw { error, text } => {
                assert!(!error.is_empty());
                assert_eq!(text, "plain text");
                assert!(ModuleOutput::diagnostic(&error, &text).ends_with("/plain text"));
            }
            other => panic!("Expected raw output, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_object_json_is_raw() {
        assert!(matches!(
            decode_output("[1, 2, 3]"),
            ModuleOutput::Raw { .. }
        ));
    }
}
