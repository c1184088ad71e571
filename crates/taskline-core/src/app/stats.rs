//! StatsCollector - スループット計測
//!
//! # 学習ポイント
//! - 処理件数は `AtomicU64` で集計（加算は順序に依存しない）
//! - publish 終了時点のスナップショットを `OnceLock` で 1 回だけ記録し、
//!   定常フェーズと drain フェーズのスループットを分けて出す
//! - `finish(self)` は collector を消費する。Arc から取り戻せない = まだ誰かが持っている

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::domain::ProcessorId;

#[derive(Debug, Clone, Copy)]
struct PhaseMark {
    at: Instant,
    processed: u64,
}

pub struct StatsCollector {
    started_at: DateTime<Utc>,
    started: Instant,
    processed: AtomicU64,
    publishing_finished: OnceLock<PhaseMark>,
}

impl StatsCollector {
    /// Start the clock.
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            processed: AtomicU64::new(0),
            publishing_finished: OnceLock::new(),
        }
    }

    /// Count one completed task; returns the new total.
    pub fn record_processed(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Live value, only meaningful for progress logging.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    /// Remember where the steady-state phase ended. Later calls are ignored.
    pub fn mark_publishing_finished(&self) {
        let mark = PhaseMark {
            at: Instant::now(),
            processed: self.processed(),
        };
        let _ = self.publishing_finished.set(mark);
    }

    /// Stop the clock and build the report.
    pub fn finish(self, published: u64, peak_queue_len: usize, workers: Vec<WorkerReport>) -> RunReport {
        let finished = Instant::now();
        let processed = self.processed.into_inner();
        let elapsed = finished.duration_since(self.started);

        let (steady_state, drain) = match self.publishing_finished.get() {
            Some(mark) => (
                Some(PhaseReport::new(mark.processed, mark.at.duration_since(self.started))),
                Some(PhaseReport::new(
                    processed - mark.processed,
                    finished.duration_since(mark.at),
                )),
            ),
            None => (None, None),
        };

        RunReport {
            started_at: self.started_at,
            published,
            processed,
            elapsed_secs: elapsed.as_secs_f64(),
            throughput: throughput(processed, elapsed),
            steady_state,
            drain,
            peak_queue_len,
            workers,
        }
    }
}

/// Tasks per second; zero when no time has passed.
pub fn throughput(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { count as f64 / secs } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub processed: u64,
    pub elapsed_secs: f64,
    pub throughput: f64,
}

impl PhaseReport {
    fn new(processed: u64, elapsed: Duration) -> Self {
        Self {
            processed,
            elapsed_secs: elapsed.as_secs_f64(),
            throughput: throughput(processed, elapsed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerReport {
    pub processor_id: ProcessorId,
    pub processed: u64,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub published: u64,
    pub processed: u64,
    pub elapsed_secs: f64,
    /// End-to-end: processed over total wall time.
    pub throughput: f64,
    /// From start until the publisher stopped.
    pub steady_state: Option<PhaseReport>,
    /// From the publisher stopping until the last worker exited.
    pub drain: Option<PhaseReport>,
    pub peak_queue_len: usize,
    pub workers: Vec<WorkerReport>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run finished (started {})", self.started_at.to_rfc3339())?;
        writeln!(f, "  processed:   {} (published {})", self.processed, self.published)?;
        writeln!(f, "  elapsed:     {:.3}s", self.elapsed_secs)?;
        writeln!(f, "  throughput:  {:.2} tasks/s", self.throughput)?;
        if let Some(phase) = &self.steady_state {
            writeln!(
                f,
                "  steady:      {} in {:.3}s ({:.2} tasks/s)",
                phase.processed, phase.elapsed_secs, phase.throughput
            )?;
        }
        if let Some(phase) = &self.drain {
            writeln!(
                f,
                "  drain:       {} in {:.3}s ({:.2} tasks/s)",
                phase.processed, phase.elapsed_secs, phase.throughput
            )?;
        }
        writeln!(f, "  peak queue:  {}", self.peak_queue_len)?;
        for worker in &self.workers {
            writeln!(f, "  {}: {}", worker.processor_id, worker.processed)?;
        }
        Ok(())
    }
}
