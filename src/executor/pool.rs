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

//! Fixed-width worker pool dispatching hosts to the host executor.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use super::error::EngineError;
use super::host::HostExecutor;
use super::result_types::HostOutcome;

/// Distributes hosts across a fixed number of concurrent workers.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    width: usize,
}

impl WorkerPool {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Run every host through `executor` and collect the outcomes.
    ///
    /// With a width of 0 or 1 hosts run one after another on the calling
    /// task. Otherwise exactly `width` workers pull from a shared queue
    /// until it is drained. Cancelling `cancel` stops all workers and
    /// discards whatever was collected so far.
    pub async fn run(
        &self,
        hosts: Vec<String>,
        executor: Arc<HostExecutor>,
        cancel: &CancellationToken,
    ) -> Result<Vec<HostOutcome>, EngineError> {
        if self.width <= 1 {
            self.run_sequential(hosts, &executor, cancel).await
        } else {
            self.run_parallel(hosts, executor, cancel).await
        }
    }

    async fn run_sequential(
        &self,
        hosts: Vec<String>,
        executor: &HostExecutor,
        cancel: &CancellationToken,
    ) -> Result<Vec<HostOutcome>, EngineError> {
        tracing::debug!("Running {} hosts sequentially", hosts.len());

        let mut outcomes = Vec::with_capacity(hosts.len());
        for host in &hosts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!("Interrupted; discarding {} collected results", outcomes.len());
                    return Err(EngineError::Interrupted);
                }
                outcome = executor.execute(host) => outcomes.push(outcome),
            }
        }
        Ok(outcomes)
    }

    async fn run_parallel(
        &self,
        hosts: Vec<String>,
        executor: Arc<HostExecutor>,
        cancel: &CancellationToken,
    ) -> Result<Vec<HostOutcome>, EngineError> {
        let total = hosts.len();
        tracing::debug!("Running {} hosts on {} workers", total, self.width);

        // All jobs are queued before any worker starts.
        let jobs = Arc::new(Mutex::new(VecDeque::from(hosts)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut workers = JoinSet::new();
        for worker_id in 0..self.width {
            let jobs = Arc::clone(&jobs);
            let executor = Arc::clone(&executor);
            let tx = tx.clone();

            workers.spawn(async move {
                loop {
                    // The lock is released before the host runs.
                    let next = jobs.lock().await.pop_front();
                    let Some(host) = next else {
                        break;
                    };
                    tracing::trace!("worker {} picked {}", worker_id, host);
                    let outcome = executor.execute(&host).await;
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let finished = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = join_workers(&mut workers) => Some(result),
        };

        match finished {
            None => {
                tracing::warn!("Interrupted; stopping {} workers", self.width);
                workers.abort_all();
                while workers.join_next().await.is_some() {}
                return Err(EngineError::Interrupted);
            }
            Some(Err(e)) => {
                tracing::error!("Worker task failed: {}", e);
                workers.abort_all();
                while workers.join_next().await.is_some() {}
                return Err(EngineError::WorkerFailed(e.to_string()));
            }
            Some(Ok(())) => {}
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Wait for every worker, stopping at the first one that panicked.
async fn join_workers(workers: &mut JoinSet<()>) -> Result<(), JoinError> {
    while let Some(joined) = workers.join_next().await {
        joined?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ModuleSpec;
    use crate::session::{Connector, Credentials, Session, SessionError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Refuses every host after a short delay, recording how many
    /// connection attempts overlap.
    #[derive(Default)]
    struct SlowRefusal {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Connector for SlowRefusal {
        async fn connect(
            &self,
            _host: &str,
            _credentials: &Credentials,
            _timeout: Duration,
        ) -> Result<Box<dyn Session>, SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Err(SessionError::Connect("refused".to_string()))
        }
    }

    fn executor(connector: Arc<SlowRefusal>) -> Arc<HostExecutor> {
        Arc::new(HostExecutor::new(
            connector,
            Credentials::new("root"),
            ModuleSpec::new("ping", "/nonexistent"),
            Duration::from_secs(1),
        ))
    }

    fn hosts(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("host{i}")).collect()
    }

    #[tokio::test]
    async fn test_parallel_runs_width_hosts_concurrently() {
        let connector = Arc::new(SlowRefusal::default());
        let outcomes = WorkerPool::new(4)
            .run(hosts(10), executor(Arc::clone(&connector)), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 10);
        assert_eq!(connector.calls.load(Ordering::SeqCst), 10);
        assert_eq!(connector.peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_width_one_runs_hosts_one_at_a_time() {
        let connector = Arc::new(SlowRefusal::default());
        let outcomes = WorkerPool::new(1)
            .run(hosts(3), executor(Arc::clone(&connector)), &CancellationToken::new())
            .await
            .unwrap();

        let order: Vec<_> = outcomes.iter().map(|o| o.host.as_str()).collect();
        assert_eq!(order, vec!["host0", "host1", "host2"]);
        assert_eq!(connector.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_host_dispatched_once() {
        let connector = Arc::new(SlowRefusal::default());
        let mut outcomes = WorkerPool::new(3)
            .run(hosts(7), executor(Arc::clone(&connector)), &CancellationToken::new())
            .await
            .unwrap();

        outcomes.sort_by(|a, b| a.host.cmp(&b.host));
        let seen: Vec<_> = outcomes.iter().map(|o| o.host.clone()).collect();
        let mut expected = hosts(7);
        expected.sort();
        assert_eq!(seen, expected);
        assert!(outcomes.iter().all(|o| !o.is_success()));
    }
}
