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

//! Inventory loading and pattern selection against files on disk.

use fleetmod::inventory::{Inventory, InventoryError, UNGROUPED};
use serial_test::serial;
use std::path::Path;
use tempfile::TempDir;

const INVENTORY: &str = "\
# production fleet
bastion

[webservers]
web1
web2
web3:2222

[dbservers]
db1
db2

[webservers]
web4
";

fn load(content: &str) -> (TempDir, Inventory) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hosts");
    std::fs::write(&path, content).unwrap();
    let inventory = Inventory::load(&path).unwrap();
    (dir, inventory)
}

#[test]
fn test_load_groups_and_ungrouped() {
    let (_dir, inventory) = load(INVENTORY);

    assert_eq!(inventory.group(UNGROUPED).unwrap(), ["bastion"]);
    assert_eq!(
        inventory.group("webservers").unwrap(),
        ["web1", "web2", "web3:2222", "web4"]
    );
    assert_eq!(inventory.group("dbservers").unwrap(), ["db1", "db2"]);
    assert_eq!(inventory.hosts().len(), 7);
}

#[test]
fn test_all_and_star_select_everything() {
    let (_dir, inventory) = load(INVENTORY);
    let all = inventory.match_hosts("all");
    assert_eq!(all.len(), 7);
    assert_eq!(inventory.match_hosts("*"), all);
}

#[test]
fn test_union_of_groups_and_globs() {
    let (_dir, inventory) = load(INVENTORY);

    assert_eq!(
        inventory.match_hosts("dbservers;bastion"),
        vec!["bastion", "db1", "db2"]
    );
    assert_eq!(
        inventory.match_hosts("web[12]:db2"),
        vec!["web1", "web2", "db2"]
    );
    assert_eq!(inventory.match_hosts("web3*"), vec!["web3:2222"]);
}

#[test]
fn test_unknown_pattern_matches_nothing() {
    let (_dir, inventory) = load(INVENTORY);
    assert!(inventory.match_hosts("mailservers").is_empty());
    assert!(inventory.match_hosts("").is_empty());
}

#[test]
fn test_missing_inventory() {
    let dir = TempDir::new().unwrap();
    let err = Inventory::load(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { .. }));
    assert!(err.to_string().starts_with("Unable to continue, inventory file not found"));
}

#[test]
#[serial]
fn test_inventory_path_tilde_expansion() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("hosts"), "[web]\nweb1\n").unwrap();

    let original_home = std::env::var("HOME").ok();
    std::env::set_var("HOME", dir.path());
    let loaded = Inventory::load(Path::new("~/hosts"));
    match original_home {
        Some(home) => std::env::set_var("HOME", home),
        None => std::env::remove_var("HOME"),
    }

    assert_eq!(loaded.unwrap().match_hosts("web"), vec!["web1"]);
}
