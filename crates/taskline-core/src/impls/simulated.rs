//! SimulatedProcessor - 高コストなハードウェアを模した処理リソース

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::domain::{ProcessorId, SimulationProfile, Task};
use crate::ports::Processor;

/// Stand-in for a device handle: a heap cell that is released exactly once.
struct Device {
    accumulator: Box<u64>,
    releases: Option<Arc<AtomicUsize>>,
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Some(releases) = &self.releases {
            releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Reference processor: pays `setup_cost` once, then `work + jitter` per task.
///
/// Not `Clone`:
///
/// ```compile_fail
/// use taskline_core::impls::SimulatedProcessor;
///
/// fn duplicate(processor: &SimulatedProcessor) -> SimulatedProcessor {
///     processor.clone()
/// }
/// ```
pub struct SimulatedProcessor {
    id: ProcessorId,
    device: Device,
    profile: SimulationProfile,
}

impl SimulatedProcessor {
    pub async fn acquire(id: ProcessorId, profile: SimulationProfile) -> Self {
        Self::acquire_inner(id, profile, None).await
    }

    /// Like `acquire`, but bumps `releases` when the device is dropped.
    pub async fn acquire_tracked(
        id: ProcessorId,
        profile: SimulationProfile,
        releases: Arc<AtomicUsize>,
    ) -> Self {
        Self::acquire_inner(id, profile, Some(releases)).await
    }

    async fn acquire_inner(
        id: ProcessorId,
        profile: SimulationProfile,
        releases: Option<Arc<AtomicUsize>>,
    ) -> Self {
        tracing::debug!(processor_id = %id, setup_cost = ?profile.setup_cost, "acquiring device");
        if !profile.setup_cost.is_zero() {
            tokio::time::sleep(profile.setup_cost).await;
        }
        Self {
            id,
            device: Device {
                accumulator: Box::new(0),
                releases,
            },
            profile,
        }
    }

    /// Tasks this device has completed.
    pub fn completed(&self) -> u64 {
        *self.device.accumulator
    }

    fn work_time(&self) -> Duration {
        let jitter_us = self.profile.jitter.as_micros() as u64;
        if jitter_us == 0 {
            return self.profile.work;
        }
        let extra = rand::thread_rng().gen_range(0..=jitter_us);
        self.profile.work + Duration::from_micros(extra)
    }
}

#[async_trait]
impl<P: Send + 'static> Processor<P> for SimulatedProcessor {
    fn id(&self) -> ProcessorId {
        self.id
    }

    async fn process(&mut self, task: &mut Task<P>) {
        let work = self.work_time();
        if !work.is_zero() {
            tokio::time::sleep(work).await;
        }
        *self.device.accumulator += 1;
        task.mark_processed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(work_ms: u64, jitter_ms: u64) -> SimulationProfile {
        SimulationProfile {
            setup_cost: Duration::from_millis(200),
            work: Duration::from_millis(work_ms),
            jitter: Duration::from_millis(jitter_ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_pays_setup_cost() {
        let start = tokio::time::Instant::now();
        let processor = SimulatedProcessor::acquire(ProcessorId::new(0), profile(10, 0)).await;

        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(processor.completed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn process_marks_task_and_counts() {
        let mut processor = SimulatedProcessor::acquire(ProcessorId::new(1), profile(100, 0)).await;
        let mut task = Task::new();

        let start = tokio::time::Instant::now();
        processor.process(&mut task).await;

        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(task.is_processed());
        assert_eq!(processor.completed(), 1);
        assert_eq!(Processor::<()>::id(&processor), ProcessorId::new(1));
    }

    #[tokio::test(start_paused = true)]
    async fn jitter_stays_within_bounds() {
        let processor = SimulatedProcessor::acquire(ProcessorId::new(0), profile(100, 20)).await;
        for _ in 0..50 {
            let work = processor.work_time();
            assert!(work >= Duration::from_millis(100));
            assert!(work <= Duration::from_millis(120));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn device_is_released_once_on_drop() {
        let releases = Arc::new(AtomicUsize::new(0));
        let processor =
            SimulatedProcessor::acquire_tracked(ProcessorId::new(0), profile(0, 0), Arc::clone(&releases))
                .await;

        // moving the processor around never releases the device
        let moved = processor;
        let boxed = Box::new(moved);
        assert_eq!(releases.load(Ordering::SeqCst), 0);

        drop(boxed);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
