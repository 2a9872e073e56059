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

//! Inventory loading and host pattern matching
//!
//! # Examples
//!
//! ```rust
//! use fleetmod::inventory::Inventory;
//!
//! let inventory = Inventory::parse("[web]\nweb1\nweb2\n[db]\ndb1\n");
//! assert_eq!(inventory.match_hosts("web:db1"), vec!["web1", "web2", "db1"]);
//! assert_eq!(inventory.match_hosts("w*"), vec!["web1", "web2"]);
//! assert!(inventory.match_hosts("nosuchgroup").is_empty());
//! ```

mod error;
mod parser;
pub mod pattern;

pub use error::InventoryError;
pub use parser::{Inventory, UNGROUPED};
pub use pattern::{matches, HostPattern};
