//! ProcessorPool - 固定サイズの処理リソース群
//!
//! # 学習ポイント
//! - リソースは起動時に 1 つずつ順番に acquire する（並列に作らない）
//! - `Vec::push` で move して格納する。既存インスタンスを複製してスロットを埋める経路は存在しない
//! - `spawn(self)` で pool を消費し、各リソースを 1 つの worker に move する
//! - worker 終了時にリソースの所有権が `WorkerExit` として戻ってくる

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::shutdown::PublishingState;
use super::stats::StatsCollector;
use super::worker_loop::{WorkerExit, WorkerLoop};
use crate::domain::{BoxError, PipelineError, ProcessorId};
use crate::impls::BoundedQueue;
use crate::ports::Processor;

pub struct ProcessorPool<R> {
    processors: Vec<R>,
}

impl<R> ProcessorPool<R> {
    /// Acquire `size` processors one after another.
    ///
    /// Stops at the first failure; processors acquired so far are dropped.
    pub async fn try_build<F, Fut, E>(size: usize, mut acquire: F) -> Result<Self, PipelineError>
    where
        F: FnMut(ProcessorId) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Into<BoxError>,
    {
        let mut processors = Vec::with_capacity(size);
        for slot in 0..size {
            let id = ProcessorId::new(slot);
            let processor = acquire(id)
                .await
                .map_err(|e| PipelineError::ProcessorInit { id, source: e.into() })?;
            tracing::info!(processor_id = %id, "processor acquired");
            processors.push(processor);
        }
        Ok(Self { processors })
    }

    /// Infallible variant of `try_build`.
    pub async fn build<F, Fut>(size: usize, mut acquire: F) -> Self
    where
        F: FnMut(ProcessorId) -> Fut,
        Fut: Future<Output = R>,
    {
        let mut processors = Vec::with_capacity(size);
        for slot in 0..size {
            let id = ProcessorId::new(slot);
            processors.push(acquire(id).await);
            tracing::info!(processor_id = %id, "processor acquired");
        }
        Self { processors }
    }

    /// Take ownership of processors that were acquired elsewhere.
    pub fn from_processors(processors: Vec<R>) -> Self {
        Self { processors }
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Move every processor into its own worker task.
    pub fn spawn<P>(
        self,
        queue: &Arc<BoundedQueue<P>>,
        publishing: &PublishingState,
        stats: &Arc<StatsCollector>,
        poll_interval: Duration,
    ) -> PoolHandle<R>
    where
        R: Processor<P>,
        P: Send + 'static,
    {
        let mut workers = Vec::with_capacity(self.processors.len());
        for processor in self.processors {
            let id = processor.id();
            let worker = WorkerLoop::new(
                processor,
                Arc::clone(queue),
                publishing.clone(),
                Arc::clone(stats),
                poll_interval,
            );
            workers.push((id, tokio::spawn(worker.run())));
        }
        PoolHandle { workers }
    }
}

/// Join handles of a running pool.
pub struct PoolHandle<R> {
    workers: Vec<(ProcessorId, JoinHandle<WorkerExit<R>>)>,
}

impl<R> PoolHandle<R> {
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait for every worker. All of them are awaited even if one panicked;
    /// the first panic is reported.
    pub async fn join(self) -> Result<Vec<WorkerExit<R>>, PipelineError> {
        let mut exits = Vec::with_capacity(self.workers.len());
        let mut first_panic = None;
        for (id, handle) in self.workers {
            match handle.await {
                Ok(exit) => exits.push(exit),
                Err(err) => {
                    tracing::error!(processor_id = %id, error = %err, "worker did not finish");
                    first_panic.get_or_insert(id);
                }
            }
        }
        match first_panic {
            Some(id) => Err(PipelineError::WorkerPanicked(id)),
            None => Ok(exits),
        }
    }
}
