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

//! Parser for flat inventory files
//!
//! The format is line oriented:
//!
//! ```text
//! # comment
//! standalone.example.com
//!
//! [web]
//! web1.example.com
//! web2.example.com
//!
//! [db]
//! db1.example.com
//! ```
//!
//! Hosts listed before the first header belong to the implicit
//! [`UNGROUPED`] group.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::error::InventoryError;
use super::pattern::HostPattern;
use crate::config::expand_tilde;

/// Name of the implicit group holding hosts declared before any header.
pub const UNGROUPED: &str = "ungrouped";

/// Parsed inventory: the flat host list plus group membership.
///
/// The flat list keeps declaration order and may contain duplicates when a
/// host is listed under several groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    hosts: Vec<String>,
    groups: HashMap<String, Vec<String>>,
}

impl Inventory {
    /// Load and parse the inventory file at `path`.
    ///
    /// A leading `~/` is expanded to the home directory.
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let path = expand_tilde(path);
        if !path.exists() {
            return Err(InventoryError::NotFound { path });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|source| InventoryError::Read { path: path.clone(), source })?;

        let inventory = Self::parse(&content);
        tracing::debug!(
            "Loaded inventory {:?}: {} host entries in {} groups",
            path,
            inventory.hosts.len(),
            inventory.groups.len()
        );
        Ok(inventory)
    }

    /// Parse inventory text.
    pub fn parse(content: &str) -> Self {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        groups.insert(UNGROUPED.to_string(), Vec::new());
        let mut hosts = Vec::new();
        let mut current = UNGROUPED.to_string();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = parse_group_header(line) {
                groups.entry(name.to_string()).or_default();
                current = name.to_string();
                continue;
            }

            groups
                .entry(current.clone())
                .or_default()
                .push(line.to_string());
            hosts.push(line.to_string());
        }

        Self { hosts, groups }
    }

    /// All declared hosts in declaration order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Group name to member hosts.
    pub fn groups(&self) -> &HashMap<String, Vec<String>> {
        &self.groups
    }

    /// Members of a single group, if it was declared.
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Resolve a pattern expression into the distinct matching hosts.
    ///
    /// Hosts are returned in declaration order; a host declared more than
    /// once is only returned the first time.
    pub fn match_hosts(&self, pattern: &str) -> Vec<String> {
        let pattern = HostPattern::parse(pattern);
        let mut seen: HashSet<&str> = HashSet::new();
        let mut matched = Vec::new();
        for host in &self.hosts {
            if !seen.insert(host.as_str()) {
                continue;
            }
            if pattern.matches(host, &self.groups) {
                matched.push(host.clone());
            }
        }
        matched
    }
}

/// Return the group name when `line` is a `[name]` header.
fn parse_group_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
# fleet inventory
lonely.example.com

[web]
web1
web2

[db]
  db1
# trailing comment
web1
";

    #[test]
    fn test_parse_groups_and_flat_list() {
        let inventory = Inventory::parse(SAMPLE);

        assert_eq!(
            inventory.hosts(),
            &["lonely.example.com", "web1", "web2", "db1", "web1"]
        );
        assert_eq!(inventory.group("web").unwrap(), &["web1", "web2"]);
        assert_eq!(inventory.group("db").unwrap(), &["db1", "web1"]);
    }

    #[test]
    fn test_hosts_before_header_are_ungrouped() {
        let inventory = Inventory::parse(SAMPLE);
        assert_eq!(
            inventory.group(UNGROUPED).unwrap(),
            &["lonely.example.com"]
        );
    }

    #[test]
    fn test_ungrouped_exists_even_when_empty() {
        let inventory = Inventory::parse("[web]\nweb1\n");
        assert_eq!(inventory.group(UNGROUPED).unwrap().len(), 0);
    }

    #[test]
    fn test_blank_lines_never_become_hosts() {
        let inventory = Inventory::parse("\n\n   \nhost1\n\n");
        assert_eq!(inventory.hosts(), &["host1"]);
        assert!(!inventory.hosts().iter().any(String::is_empty));
    }

    #[test]
    fn test_header_name_is_trimmed() {
        let inventory = Inventory::parse("[ app servers ]\napp1\n");
        assert_eq!(inventory.group("app servers").unwrap(), &["app1"]);
    }

    #[test]
    fn test_reopened_group_keeps_earlier_members() {
        let inventory = Inventory::parse("[web]\nweb1\n[db]\ndb1\n[web]\nweb2\n");
        assert_eq!(inventory.group("web").unwrap(), &["web1", "web2"]);
    }

    #[test]
    fn test_match_hosts_deduplicates() {
        let inventory = Inventory::parse(SAMPLE);
        assert_eq!(
            inventory.match_hosts("all"),
            vec!["lonely.example.com", "web1", "web2", "db1"]
        );
    }

    #[test]
    fn test_match_hosts_large_inventory_keeps_first_position() {
        let mut text = String::from("[a]\n");
        for i in 0..5000 {
            text.push_str(&format!("node{i}\n"));
        }
        text.push_str("[b]\n");
        for i in (0..5000).rev() {
            text.push_str(&format!("node{i}\n"));
        }

        let inventory = Inventory::parse(&text);
        let matched = inventory.match_hosts("a:b");

        assert_eq!(matched.len(), 5000);
        assert_eq!(matched.first().map(String::as_str), Some("node0"));
        assert_eq!(matched.last().map(String::as_str), Some("node4999"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Inventory::load(Path::new("/nonexistent/fleetmod/hosts")).unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hosts");
        fs::write(&path, SAMPLE).unwrap();

        let inventory = Inventory::load(&path).unwrap();
        assert_eq!(inventory, Inventory::parse(SAMPLE));
    }
}
