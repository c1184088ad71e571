//! Impls - 具体的な実装
//!
//! - BoundedQueue: 容量制限付きの in-memory FIFO
//! - SimulatedProcessor: 開発・ベンチ用の処理リソース

pub mod bounded_queue;
pub mod simulated;

pub use self::bounded_queue::BoundedQueue;
pub use self::simulated::SimulatedProcessor;
