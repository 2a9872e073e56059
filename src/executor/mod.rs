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

//! Parallel module execution engine.

mod error;
mod host;
mod module;
mod pool;
mod result_types;
mod runner;

// Re-export public types
pub use error::{EngineError, HostError};
pub use host::{HostExecutor, ProtocolStage, DEFAULT_LOG_TAG, MKTEMP_COMMAND};
pub use module::{decode_output, ModuleArgs, ModuleOutput, ModuleSpec, Payload};
pub use pool::WorkerPool;
pub use result_types::{HostOutcome, OutcomeStatus, ResultSet};
pub use runner::{
    run, ExecutionMode, Runner, RunnerConfig, DEFAULT_FORKS, DEFAULT_TIMEOUT_SECS,
};
