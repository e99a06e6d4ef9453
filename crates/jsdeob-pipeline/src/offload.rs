//! Offload engine (§5): runs pipeline jobs on a small pool of named worker
//! threads so the async HTTP surface never blocks on CPU-bound parsing,
//! pass execution, or boa evaluation. Adapted from `otter-runtime`'s
//! `Engine`/`EngineHandle`/`Job` worker pool (`otter-runtime::engine`,
//! `otter-runtime::worker`): a bounded `crossbeam_channel` job queue feeding
//! named threads, each owning one [`PipelineDriver`], with results
//! delivered back over a `tokio::sync::oneshot` channel.
//!
//! Per §5, "the worker boundary marshals only Source strings and Recipe
//! values, never ASTs" — jobs carry `String`/`Recipe` in and `RunReport`
//! out, so no `swc` AST type ever crosses a thread boundary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use jsdeob_ast::model::Recipe;
use jsdeob_runtime::RuntimePolicy;
use tokio::sync::oneshot;

use crate::driver::PipelineDriver;
use crate::error::{PipelineError, PipelineResult};

enum Job {
    RunPipeline {
        source: String,
        recipe: Recipe,
        response: oneshot::Sender<PipelineResult<jsdeob_ast::model::RunReport>>,
    },
}

#[derive(Default)]
struct Stats {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time counters for a running [`PipelineEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStatsSnapshot {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Builds a [`PipelineEngine`] with the worker count, job queue depth, and
/// runtime policy the host wants.
pub struct PipelineEngineBuilder {
    pool_size: usize,
    queue_capacity: usize,
    policy: RuntimePolicy,
}

impl Default for PipelineEngineBuilder {
    fn default() -> Self {
        Self {
            pool_size: num_cpus_fallback(),
            queue_capacity: 256,
            policy: RuntimePolicy::default(),
        }
    }
}

fn num_cpus_fallback() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(2)
}

impl PipelineEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn policy(mut self, policy: RuntimePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> PipelineEngine {
        let (sender, receiver) = crossbeam_channel::bounded::<Job>(self.queue_capacity);
        let stats = Arc::new(Stats::default());
        let driver = PipelineDriver::new(self.policy);

        let mut workers = Vec::with_capacity(self.pool_size);
        for index in 0..self.pool_size {
            let receiver = receiver.clone();
            let stats = stats.clone();
            let driver = driver.clone();
            let handle = std::thread::Builder::new()
                .name(format!("jsdeob-pipeline-worker-{index}"))
                .spawn(move || worker_loop(receiver, driver, stats))
                .expect("failed to spawn pipeline worker thread");
            workers.push(handle);
        }

        PipelineEngine {
            handle: PipelineEngineHandle { sender },
            workers,
            stats,
            pool_size: self.pool_size,
        }
    }
}

fn worker_loop(receiver: crossbeam_channel::Receiver<Job>, driver: PipelineDriver, stats: Arc<Stats>) {
    while let Ok(job) = receiver.recv() {
        match job {
            Job::RunPipeline { source, recipe, response } => {
                let result = driver.run_batch(&source, &recipe);
                match &result {
                    Ok(_) => stats.completed.fetch_add(1, Ordering::Relaxed),
                    Err(_) => stats.failed.fetch_add(1, Ordering::Relaxed),
                };
                let _ = response.send(result);
            }
        }
    }
}

/// A cheaply cloneable handle for submitting pipeline runs to an
/// [`PipelineEngine`]'s worker pool.
#[derive(Clone)]
pub struct PipelineEngineHandle {
    sender: crossbeam_channel::Sender<Job>,
}

impl PipelineEngineHandle {
    /// Submits a batch run and awaits its result without blocking the
    /// calling async task's executor thread.
    pub async fn run(&self, source: String, recipe: Recipe) -> PipelineResult<jsdeob_ast::model::RunReport> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Job::RunPipeline { source, recipe, response: tx })
            .map_err(|_| PipelineError::Internal("pipeline engine has shut down".to_string()))?;
        rx.await
            .map_err(|_| PipelineError::Internal("pipeline worker dropped the response channel".to_string()))?
    }
}

/// Owns the worker thread pool and job queue. Dropping the engine without
/// calling [`shutdown`](Self::shutdown) still lets queued jobs drain, since
/// dropping the last `Sender` closes the channel and workers exit their
/// `recv` loop once it empties.
pub struct PipelineEngine {
    handle: PipelineEngineHandle,
    workers: Vec<std::thread::JoinHandle<()>>,
    stats: Arc<Stats>,
    pool_size: usize,
}

impl PipelineEngine {
    pub fn builder() -> PipelineEngineBuilder {
        PipelineEngineBuilder::new()
    }

    pub fn handle(&self) -> PipelineEngineHandle {
        self.handle.clone()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            submitted: self.stats.submitted.load(Ordering::Relaxed),
            completed: self.stats.completed.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        }
    }

    /// Submits a run and increments the submitted counter before handing
    /// off to a worker.
    pub async fn run(&self, source: String, recipe: Recipe) -> PipelineResult<jsdeob_ast::model::RunReport> {
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        self.handle.run(source, recipe).await
    }

    /// Closes the job queue and waits for every worker thread to drain and
    /// exit. Consumes `self`: there is no engine left to submit to once a
    /// shutdown has started.
    pub async fn shutdown(self) {
        let PipelineEngine { handle, workers, .. } = self;
        drop(handle);
        for worker in workers {
            let _ = tokio::task::spawn_blocking(move || worker.join()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsdeob_ast::model::{Recipe, RecipeStep, TransformKind, TransformStep};
    use serde_json::json;

    fn constant_folding_recipe() -> Recipe {
        Recipe {
            steps: vec![RecipeStep::Transform(TransformStep {
                id: "constantFolding".to_string(),
                kind: TransformKind::Builtin,
                code: None,
                config: json!({}),
                enabled: true,
                iterations: 1,
            })],
        }
    }

    #[tokio::test]
    async fn runs_a_job_and_reports_stats() {
        let engine = PipelineEngine::builder().pool_size(2).build();
        let report = engine.run("var x = 1 + 2;".to_string(), constant_folding_recipe()).await.unwrap();
        assert!(report.success);
        let stats = engine.stats();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.completed, 1);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn handle_can_be_cloned_and_used_independently() {
        let engine = PipelineEngine::builder().pool_size(1).build();
        let handle = engine.handle();
        let report = handle.run("var x = 1;".to_string(), constant_folding_recipe()).await.unwrap();
        assert!(report.success);
        engine.shutdown().await;
    }
}
