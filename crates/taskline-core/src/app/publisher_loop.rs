//! PublisherLoop - 時間制限付きの Task 生成
//!
//! # フロー
//! 1. 締め切り（start + publish_duration）まで Task を作り続ける
//! 2. キューが full なら retry_interval だけ待って再試行（Task は捨てない）
//! 3. 締め切りを過ぎたら publish 終了を 1 回だけ通知する

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::shutdown::ShutdownCoordinator;
use super::stats::StatsCollector;
use crate::domain::Task;
use crate::impls::BoundedQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSummary {
    pub published: u64,
    /// How many times a push found the queue full.
    pub full_queue_waits: u64,
}

pub struct PublisherLoop<P, S> {
    queue: Arc<BoundedQueue<P>>,
    shutdown: ShutdownCoordinator,
    stats: Arc<StatsCollector>,
    duration: Duration,
    retry_interval: Duration,
    source: S,
}

impl<P, S> PublisherLoop<P, S>
where
    P: Send + 'static,
    S: FnMut() -> Task<P> + Send + 'static,
{
    pub fn new(
        queue: Arc<BoundedQueue<P>>,
        shutdown: ShutdownCoordinator,
        stats: Arc<StatsCollector>,
        duration: Duration,
        retry_interval: Duration,
        source: S,
    ) -> Self {
        Self {
            queue,
            shutdown,
            stats,
            duration,
            retry_interval,
            source,
        }
    }

    pub async fn run(mut self) -> PublishSummary {
        let deadline = Instant::now() + self.duration;
        let mut summary = PublishSummary {
            published: 0,
            full_queue_waits: 0,
        };

        while Instant::now() < deadline {
            let task = (self.source)();
            summary.full_queue_waits += self.queue.push(task, self.retry_interval).await;
            summary.published += 1;
        }

        self.stats.mark_publishing_finished();
        self.shutdown.finish_publishing();
        tracing::info!(
            published = summary.published,
            full_queue_waits = summary.full_queue_waits,
            "publisher finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRY: Duration = Duration::from_millis(10);

    #[tokio::test(start_paused = true)]
    async fn zero_duration_publishes_nothing() {
        let queue: Arc<BoundedQueue> = Arc::new(BoundedQueue::new(4));
        let shutdown = ShutdownCoordinator::new();
        let publishing = shutdown.subscribe();
        let stats = Arc::new(StatsCollector::start());

        let publisher = PublisherLoop::new(
            Arc::clone(&queue),
            shutdown,
            stats,
            Duration::ZERO,
            RETRY,
            Task::new,
        );
        let summary = publisher.run().await;

        assert_eq!(summary.published, 0);
        assert!(!publishing.is_active());
        assert!(queue.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn blocks_on_full_queue_instead_of_dropping() {
        let queue: Arc<BoundedQueue> = Arc::new(BoundedQueue::new(5));
        let shutdown = ShutdownCoordinator::new();
        let publishing = shutdown.subscribe();
        let stats = Arc::new(StatsCollector::start());

        let publisher = PublisherLoop::new(
            Arc::clone(&queue),
            shutdown,
            stats,
            Duration::from_millis(100),
            RETRY,
            Task::new,
        );
        let handle = tokio::spawn(publisher.run());

        // past the deadline, but the sixth push is still waiting for space
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!handle.is_finished());
        assert!(publishing.is_active());
        assert_eq!(queue.len().await, 5);

        let mut drained = 0;
        while drained < 6 {
            if queue.pop().await.is_some() {
                drained += 1;
            } else {
                tokio::time::sleep(RETRY).await;
            }
        }

        let summary = handle.await.unwrap();
        assert_eq!(summary.published, 6);
        assert!(summary.full_queue_waits > 0);
        assert!(!publishing.is_active());
        assert!(queue.is_empty().await);
        assert_eq!(queue.peak_len().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn uses_the_given_source() {
        let queue = Arc::new(BoundedQueue::new(64));
        let shutdown = ShutdownCoordinator::new();
        let stats = Arc::new(StatsCollector::start());

        let mut next = 0u32;
        let source = move || {
            next += 1;
            Task::with_payload(next)
        };
        let publisher = PublisherLoop::new(
            Arc::clone(&queue),
            shutdown,
            stats,
            Duration::from_millis(30),
            RETRY,
            source,
        );
        let handle = tokio::spawn(publisher.run());

        // let the deadline pass; the queue fills to capacity and the push waits
        tokio::time::sleep(Duration::from_millis(50)).await;
        let first = queue.pop().await.unwrap();
        assert_eq!(*first.payload(), 1);

        while !handle.is_finished() {
            queue.pop().await;
            tokio::time::sleep(RETRY).await;
        }
        let summary = handle.await.unwrap();
        assert!(summary.published >= 64);
    }
}
