//! taskline-core
//!
//! Bounded producer/consumer pipeline: a time-boxed publisher fills a bounded
//! queue, a fixed pool of exclusively-owned processors drains it, and the run
//! ends with a throughput report once publishing stops and the queue is empty.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Task, ids, config, errors）
//! - **ports**: 抽象化レイヤー（Processor）
//! - **impls**: 実装（BoundedQueue, SimulatedProcessor）
//! - **app**: アプリケーションロジック（pipeline, pool, worker_loop, publisher_loop, shutdown, stats）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Pipeline, ProcessorPool, RunOutcome, RunReport};
pub use domain::{PipelineConfig, PipelineError, SimulationProfile, Task};
pub use impls::{BoundedQueue, SimulatedProcessor};
pub use ports::Processor;
