//! Bounded parallel execution of independent tasks.
//!
//! The import action uses this to create missing foreign-key dependencies concurrently:
//!
//! - tasks run on a dedicated rayon pool
//! - a counting semaphore caps how many run at once ([`ExecutionOptions::max_in_flight`])
//! - real-time metrics + observer hooks report progress

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::error::ImportResult;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    TracingExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Worker threads; `None` uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Upper bound on concurrently running tasks.
    pub max_in_flight: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            num_threads: Some(n.min(8)),
            max_in_flight: n.clamp(1, 8),
        }
    }
}

/// Runs batches of independent tasks on a private thread pool.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create an engine. Zero thread or in-flight counts are raised to one.
    pub fn new(opts: ExecutionOptions) -> ImportResult<Self> {
        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("csv-seeder-{i}"))
            .build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Handle to the live metrics of the most recent run.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run `task` over every item, at most `max_in_flight` at a time.
    ///
    /// Tasks may start in any order; results come back in input order.
    pub fn run_all<T, R, F>(&self, items: Vec<T>, task: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted { tasks: items.len() });

        let sem = Semaphore::new(self.opts.max_in_flight);
        let out: Vec<R> = self.pool.install(|| {
            items
                .into_par_iter()
                .enumerate()
                .map(|(index, item)| {
                    let permit = sem.acquire();
                    if !permit.waited.is_zero() {
                        self.metrics.on_throttle_wait(permit.waited);
                        self.emit(ExecutionEvent::ThrottleWaited {
                            duration: permit.waited,
                        });
                    }

                    self.metrics.on_task_start();
                    self.emit(ExecutionEvent::TaskStarted { index });
                    let result = task(item);
                    self.emit(ExecutionEvent::TaskFinished { index });
                    self.metrics.on_task_end();
                    drop(permit);
                    result
                })
                .collect()
        });

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });
        out
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
