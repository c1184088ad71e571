//! Pipeline - publisher / queue / worker pool / stats のワイヤリング
//!
//! # 学習ポイント
//! - グローバル変数の代わりに、共有するもの（キュー・統計）を `Arc` で明示的に渡す
//! - 起動前に設定を検証する（Fail-fast）
//! - 統計は全 worker の join 後に `Arc::try_unwrap` で取り戻してから読む

use std::sync::Arc;

use tracing::Instrument;

use super::pool::ProcessorPool;
use super::publisher_loop::PublisherLoop;
use super::shutdown::ShutdownCoordinator;
use super::stats::{RunReport, StatsCollector};
use super::worker_loop::WorkerExit;
use crate::domain::{ConfigError, PipelineConfig, PipelineError, Task};
use crate::impls::BoundedQueue;
use crate::ports::Processor;

/// Report plus the processors, handed back once every worker has exited.
pub struct RunOutcome<R> {
    pub report: RunReport,
    pub processors: Vec<R>,
}

/// A validated pipeline configuration, ready to run.
///
/// # 使用例
/// ```ignore
/// let pipeline = Pipeline::new(config)?;
/// let pool = ProcessorPool::build(config.pool_size, |id| SimulatedProcessor::acquire(id, profile.clone())).await;
/// let outcome = pipeline.run(pool).await?;
/// println!("{}", outcome.report);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run with payload-less tasks.
    pub async fn run<R>(&self, pool: ProcessorPool<R>) -> Result<RunOutcome<R>, PipelineError>
    where
        R: Processor<()>,
    {
        self.run_with_source(pool, Task::new).await
    }

    /// Run with tasks produced by `source`.
    pub async fn run_with_source<R, P, S>(
        &self,
        pool: ProcessorPool<R>,
        source: S,
    ) -> Result<RunOutcome<R>, PipelineError>
    where
        R: Processor<P>,
        P: Send + 'static,
        S: FnMut() -> Task<P> + Send + 'static,
    {
        if pool.len() != self.config.pool_size {
            return Err(PipelineError::PoolSizeMismatch {
                expected: self.config.pool_size,
                actual: pool.len(),
            });
        }

        let queue = Arc::new(BoundedQueue::new(self.config.queue_capacity));
        let shutdown = ShutdownCoordinator::new();
        let stats = Arc::new(StatsCollector::start());

        let workers = pool.spawn(
            &queue,
            &shutdown.subscribe(),
            &stats,
            self.config.poll_interval,
        );

        let publisher = PublisherLoop::new(
            Arc::clone(&queue),
            shutdown,
            Arc::clone(&stats),
            self.config.publish_duration,
            self.config.poll_interval,
            source,
        );
        let mut publisher = tokio::spawn(publisher.run().instrument(tracing::info_span!("publisher")));
        let join = workers.join();
        tokio::pin!(join);

        // Workers are always joined, even if the publisher panicked.
        let (published, exits) = tokio::select! {
            published = &mut publisher => (published, join.await),
            exits = &mut join => {
                if exits.is_err() {
                    // nobody is left to drain the queue; a blocked push would wait forever
                    tracing::error!("every worker has exited; stopping the publisher");
                    publisher.abort();
                }
                (publisher.await, exits)
            }
        };
        let exits = exits?;
        let summary = published.map_err(|_| PipelineError::PublisherPanicked)?;

        let peak_queue_len = queue.peak_len().await;
        let stats = Arc::try_unwrap(stats).map_err(|_| PipelineError::WorkersStillRunning)?;
        let report = stats.finish(
            summary.published,
            peak_queue_len,
            exits.iter().map(WorkerExit::report).collect(),
        );

        if report.processed != report.published {
            return Err(PipelineError::TaskAccounting {
                published: report.published,
                processed: report.processed,
            });
        }

        tracing::info!(
            processed = report.processed,
            elapsed_secs = report.elapsed_secs,
            throughput = report.throughput,
            "pipeline finished"
        );

        Ok(RunOutcome {
            report,
            processors: exits.into_iter().map(|exit| exit.processor).collect(),
        })
    }
}
