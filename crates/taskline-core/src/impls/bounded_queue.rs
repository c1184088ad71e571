//! BoundedQueue - 容量制限付きの FIFO キュー
//!
//! # 学習ポイント
//! - `tokio::sync::Mutex` で VecDeque を保護（ロックを跨いで await しない）
//! - full のときは `QueueFull` で Task を呼び出し元に返す（取りこぼさない）
//! - pop は待たない。空なら `None` を返し、呼び出し側が shutdown 条件を確認できるようにする

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::{QueueFull, Task};

struct QueueState<P> {
    tasks: VecDeque<Task<P>>,
    /// Highest length ever observed under the lock.
    peak: usize,
}

/// Thread-safe FIFO of pending tasks holding at most `capacity` of them.
///
/// # 使用例
/// ```ignore
/// let queue = BoundedQueue::new(1000);
/// queue.push(Task::new(), Duration::from_millis(10)).await;
/// let task = queue.pop().await;
/// ```
pub struct BoundedQueue<P = ()> {
    state: Mutex<QueueState<P>>,
    capacity: usize,
}

impl<P> BoundedQueue<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::with_capacity(capacity),
                peak: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert at the tail, or hand the task back if the queue is saturated.
    pub async fn try_push(&self, task: Task<P>) -> Result<(), QueueFull<P>> {
        let mut state = self.state.lock().await;
        if state.tasks.len() >= self.capacity {
            return Err(QueueFull(task));
        }
        state.tasks.push_back(task);
        state.peak = state.peak.max(state.tasks.len());
        Ok(())
    }

    /// Insert at the tail, sleeping `retry_interval` between attempts while full.
    ///
    /// Returns how many times the queue was found full.
    pub async fn push(&self, task: Task<P>, retry_interval: Duration) -> u64 {
        let mut task = task;
        let mut rejections = 0;
        loop {
            match self.try_push(task).await {
                Ok(()) => return rejections,
                Err(QueueFull(rejected)) => {
                    rejections += 1;
                    task = rejected;
                    tokio::time::sleep(retry_interval).await;
                }
            }
        }
    }

    /// Remove the head if there is one. Never waits.
    pub async fn pop(&self) -> Option<Task<P>> {
        let mut state = self.state.lock().await;
        state.tasks.pop_front()
    }

    pub async fn len(&self) -> usize {
        let state = self.state.lock().await;
        state.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// High-water mark since construction.
    pub async fn peak_len(&self) -> usize {
        let state = self.state.lock().await;
        state.peak
    }
}
