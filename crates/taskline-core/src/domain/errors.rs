//! Errors - エラー型と分類
//!
//! - `ConfigError`: 起動前に検出できる設定ミス（Fail-fast）
//! - `PipelineError`: 実行時のエラー。キューの full/empty はエラーではないのでここには含めない
//! - `QueueFull`: backpressure のシグナル。拒否された Task を呼び出し元に返す

use std::path::PathBuf;

use thiserror::Error;

use super::{ProcessorId, Task};

/// Boxed error returned by a processor factory.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pool_size must be at least 1")]
    ZeroPoolSize,

    #[error("queue_capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("poll_interval must be greater than zero")]
    ZeroPollInterval,

    #[error("publish_duration of {0:?} cannot be scheduled from now")]
    PublishDurationTooLong(std::time::Duration),

    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("pool has {actual} processors but pool_size is {expected}")]
    PoolSizeMismatch { expected: usize, actual: usize },

    #[error("failed to acquire {id}")]
    ProcessorInit {
        id: ProcessorId,
        #[source]
        source: BoxError,
    },

    #[error("worker bound to {0} panicked")]
    WorkerPanicked(ProcessorId),

    #[error("publisher panicked")]
    PublisherPanicked,

    #[error("stats collector is still shared; some worker has not exited")]
    WorkersStillRunning,

    #[error("published {published} tasks but processed {processed}")]
    TaskAccounting { published: u64, processed: u64 },
}

/// Returned by `BoundedQueue::try_push` when the queue is saturated.
///
/// The rejected task is handed back so nothing is silently dropped.
#[derive(Debug)]
pub struct QueueFull<P = ()>(pub Task<P>);

impl<P> QueueFull<P> {
    pub fn into_task(self) -> Task<P> {
        self.0
    }
}
