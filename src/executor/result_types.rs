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

//! Per-host outcomes and the aggregated result set.

use serde::Serialize;
use std::collections::BTreeMap;

use super::module::{ModuleOutput, Payload};

/// Terminal classification of one host.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// Reached, module ran, output decoded.
    Contacted(Payload),
    /// Unreachable, failed mid-protocol, or undecodable output.
    Dark(String),
}

impl From<ModuleOutput> for OutcomeStatus {
    fn from(output: ModuleOutput) -> Self {
        match output {
            ModuleOutput::Decoded(payload) => Self::Contacted(payload),
            ModuleOutput::Raw { error, text } => {
                Self::Dark(ModuleOutput::diagnostic(&error, &text))
            }
        }
    }
}

/// Result of running the full protocol against one host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostOutcome {
    pub host: String,
    pub status: OutcomeStatus,
}

impl HostOutcome {
    pub fn contacted(host: impl Into<String>, payload: Payload) -> Self {
        Self {
            host: host.into(),
            status: OutcomeStatus::Contacted(payload),
        }
    }

    pub fn dark(host: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            status: OutcomeStatus::Dark(diagnostic.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Contacted(_))
    }
}

/// Final output of a run: every matched host in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub contacted: BTreeMap<String, Payload>,
    pub dark: BTreeMap<String, String>,
}

impl ResultSet {
    /// Partition outcomes by host. A repeated host keeps its last outcome.
    pub fn aggregate(outcomes: impl IntoIterator<Item = HostOutcome>) -> Self {
        let mut results = Self::default();
        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Contacted(payload) => {
                    results.dark.remove(&outcome.host);
                    results.contacted.insert(outcome.host, payload);
                }
                OutcomeStatus::Dark(diagnostic) => {
                    results.contacted.remove(&outcome.host);
                    results.dark.insert(outcome.host, diagnostic);
                }
            }
        }
        results
    }

    /// Both buckets empty: the pattern selected no host.
    pub fn no_hosts_matched(&self) -> bool {
        self.contacted.is_empty() && self.dark.is_empty()
    }

    pub fn has_dark_hosts(&self) -> bool {
        !self.dark.is_empty()
    }

    /// Number of hosts across both buckets.
    pub fn len(&self) -> usize {
        self.contacted.len() + self.dark.len()
    }

    pub fn is_empty(&self) -> bool {
        self.no_hosts_matched()
    }

    /// All hosts that were part of the run, sorted.
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self
            .contacted
            .keys()
            .chain(self.dark.keys())
            .map(String::as_str)
            .collect();
        hosts.sort_unstable();
        hosts
    }
}
