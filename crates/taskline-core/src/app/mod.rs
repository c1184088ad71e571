//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **Pipeline**: 設定の検証と全体のワイヤリング
//! - **ProcessorPool**: 処理リソースの acquire と worker への割り当て
//! - **WorkerLoop**: pop→process→count のループ
//! - **PublisherLoop**: 締め切りまで Task を生成
//! - **ShutdownCoordinator**: publish 終了フラグ
//! - **StatsCollector**: 処理件数とスループット

pub mod pipeline;
pub mod pool;
pub mod publisher_loop;
pub mod shutdown;
pub mod stats;
pub mod worker_loop;

pub use self::pipeline::{Pipeline, RunOutcome};
pub use self::pool::{PoolHandle, ProcessorPool};
pub use self::publisher_loop::{PublishSummary, PublisherLoop};
pub use self::shutdown::{PublishingState, ShutdownCoordinator};
pub use self::stats::{PhaseReport, RunReport, StatsCollector, WorkerReport};
pub use self::worker_loop::{WorkerExit, WorkerLoop};
