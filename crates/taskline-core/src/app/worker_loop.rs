//! WorkerLoop - タスク実行ループ
//!
//! # フロー
//! 1. `BoundedQueue::pop()` で Task を取る（待たない）
//! 2. 取れたら `Processor::process()` → 件数を加算 → Task を破棄
//! 3. 取れなかったら終了条件を確認し、満たさなければ poll_interval だけ sleep
//!
//! 終了条件は「publish 終了 かつ キューが空」のみ。
//! フラグを先に読み、その後で長さを読む（publisher は最後の push の後にフラグを倒す）。

use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use super::shutdown::PublishingState;
use super::stats::{StatsCollector, WorkerReport};
use crate::domain::ProcessorId;
use crate::impls::BoundedQueue;
use crate::ports::Processor;

/// One worker bound to one processor for the whole run.
pub struct WorkerLoop<R, P = ()> {
    processor: R,
    queue: Arc<BoundedQueue<P>>,
    publishing: PublishingState,
    stats: Arc<StatsCollector>,
    poll_interval: Duration,
}

/// What a worker hands back when it exits, including ownership of its processor.
pub struct WorkerExit<R> {
    pub processor_id: ProcessorId,
    pub processed: u64,
    pub processor: R,
}

impl<R> WorkerExit<R> {
    pub fn report(&self) -> WorkerReport {
        WorkerReport {
            processor_id: self.processor_id,
            processed: self.processed,
        }
    }
}

impl<R, P> WorkerLoop<R, P>
where
    R: Processor<P>,
    P: Send + 'static,
{
    pub fn new(
        processor: R,
        queue: Arc<BoundedQueue<P>>,
        publishing: PublishingState,
        stats: Arc<StatsCollector>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            processor,
            queue,
            publishing,
            stats,
            poll_interval,
        }
    }

    /// Run until publishing has finished and the queue is drained.
    pub async fn run(self) -> WorkerExit<R> {
        let processor_id = self.processor.id();
        let span = tracing::info_span!("worker", processor_id = %processor_id);
        self.run_inner(processor_id).instrument(span).await
    }

    async fn run_inner(mut self, processor_id: ProcessorId) -> WorkerExit<R> {
        let mut processed = 0;
        loop {
            match self.queue.pop().await {
                Some(mut task) => {
                    self.processor.process(&mut task).await;
                    if !task.is_processed() {
                        tracing::warn!(task_id = %task.id(), "processor returned task unmarked");
                    }
                    let total = self.stats.record_processed();
                    processed += 1;
                    tracing::debug!(task_id = %task.id(), total, "task processed");
                }
                None => {
                    if should_terminate(&self.publishing, &self.queue).await {
                        break;
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        tracing::info!(processed, "worker finished");
        WorkerExit {
            processor_id,
            processed,
            processor: self.processor,
        }
    }
}

/// Flag first, then length.
async fn should_terminate<P>(publishing: &PublishingState, queue: &BoundedQueue<P>) -> bool {
    !publishing.is_active() && queue.is_empty().await
}
