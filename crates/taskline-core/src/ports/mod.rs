//! Ports - 抽象化レイヤー
//!
//! パイプラインの外側から差し替えられるのは「処理リソース」だけです。
//! 下流（推論など）は `Processor` を実装して自分の Task payload を処理します。

pub mod processor;

pub use self::processor::Processor;
