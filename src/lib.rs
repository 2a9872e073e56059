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

//! Run a self-contained module on a fleet of hosts over SSH and collect
//! the JSON each copy prints.
//!
//! The engine lives in [`executor`]: [`executor::Runner`] resolves a host
//! pattern against an [`inventory::Inventory`], hands the hosts to a
//! fixed-width [`executor::WorkerPool`] and aggregates every
//! [`executor::HostOutcome`] into a [`executor::ResultSet`]. Remote access
//! goes through the [`session::Connector`] and [`session::Session`] traits;
//! [`ssh::SshConnector`] implements them over russh.

pub mod cli;
pub mod config;
pub mod executor;
pub mod inventory;
pub mod node;
pub mod session;
pub mod ssh;
pub mod ui;
pub mod utils;

pub use executor::{run, EngineError, ResultSet, Runner, RunnerConfig};
pub use inventory::Inventory;
pub use session::{Connector, Credentials, Session};
