//! Processor port - 排他的に所有される処理リソース
//!
//! # 学習ポイント
//! - `&mut self` で process を受けるので、同じインスタンスへの並行呼び出しは借用チェッカが拒否する
//! - `Clone` を要求しない（むしろ実装しない）ことで、生きたハンドルの複製を型で禁止する
//! - pool は各インスタンスを move で 1 つの worker に渡す

use async_trait::async_trait;

use crate::domain::{ProcessorId, Task};

/// An exclusively-owned, expensive-to-acquire resource that processes tasks.
///
/// Implementations model things like a device handle or a loaded model. They
/// should not implement `Clone`; the pool moves each instance into exactly one
/// worker and hands it back when that worker exits.
///
/// # 使用例
/// ```ignore
/// struct Detector { id: ProcessorId, model: Model }
///
/// #[async_trait]
/// impl Processor<Frame> for Detector {
///     fn id(&self) -> ProcessorId { self.id }
///
///     async fn process(&mut self, task: &mut Task<Frame>) {
///         self.model.infer(task.payload_mut()).await;
///         task.mark_processed();
///     }
/// }
/// ```
#[async_trait]
pub trait Processor<P = ()>: Send + 'static
where
    P: Send + 'static,
{
    fn id(&self) -> ProcessorId;

    /// Do the work for one task, then mark it processed.
    async fn process(&mut self, task: &mut Task<P>);
}
