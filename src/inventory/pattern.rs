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

//! Host pattern expressions
//!
//! An expression is a `:` separated list of sub-patterns (`;` is accepted as
//! an alias separator). A host matches when any sub-pattern matches it:
//! - `all` matches every host
//! - a shell-style glob (`*`, `?`, `[...]`) is matched against the host name
//! - any other text is looked up as a group name

use glob::Pattern;
use std::collections::HashMap;

/// Keyword matching every host.
pub const ALL: &str = "all";

/// A single sub-pattern of an expression.
#[derive(Debug, Clone)]
struct SubPattern {
    raw: String,
    glob: Option<Pattern>,
}

impl SubPattern {
    fn new(raw: &str) -> Self {
        // An invalid glob such as an unclosed `[` still matches its literal text.
        let glob = Pattern::new(raw).ok();
        Self {
            raw: raw.to_string(),
            glob,
        }
    }

    fn matches(&self, host: &str, groups: &HashMap<String, Vec<String>>) -> bool {
        if self.raw == ALL {
            return true;
        }

        let glob_match = match &self.glob {
            Some(pattern) => pattern.matches(host),
            None => self.raw == host,
        };
        if glob_match {
            return true;
        }

        groups
            .get(&self.raw)
            .is_some_and(|members| members.iter().any(|m| m == host))
    }
}

/// A parsed pattern expression.
#[derive(Debug, Clone)]
pub struct HostPattern {
    subpatterns: Vec<SubPattern>,
}

impl HostPattern {
    /// Split an expression into its sub-patterns.
    pub fn parse(expression: &str) -> Self {
        let normalized = expression.replace(';', ":");
        let subpatterns = normalized.split(':').map(SubPattern::new).collect();
        Self { subpatterns }
    }

    /// Check whether `host` satisfies any sub-pattern.
    ///
    /// The empty host name never matches.
    pub fn matches(&self, host: &str, groups: &HashMap<String, Vec<String>>) -> bool {
        if host.is_empty() {
            return false;
        }
        self.subpatterns.iter().any(|sub| sub.matches(host, groups))
    }
}

/// Evaluate `expression` against a single host.
pub fn matches(host: &str, expression: &str, groups: &HashMap<String, Vec<String>>) -> bool {
    HostPattern::parse(expression).matches(host, groups)
}
