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

//! Configuration management for fleetmod.

mod loader;
mod resolver;
mod types;
mod utils;

pub use loader::default_config_path;
pub use resolver::{DEFAULT_INVENTORY, DEFAULT_MODULE_NAME, DEFAULT_MODULE_PATH, DEFAULT_USER};
pub use types::{Config, Defaults};
pub use utils::expand_tilde;
