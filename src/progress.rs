//! Observer port for batch progress.

use crate::model::{BatchStatus, CandidateAnalysis};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which step of the batch a snapshot reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressPhase {
    /// `current_file` is about to be analyzed; `processed` is its index.
    Analyzing,
    /// The record for `current_file` is the last entry of `results`.
    Analyzed,
    /// Every admitted document has a record.
    Complete,
}

/// Receives an immutable snapshot after every step of a batch.
///
/// `results` holds every record appended so far, in input order.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, phase: ProgressPhase, status: &BatchStatus, results: &[CandidateAnalysis]);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressPhase, &BatchStatus, &[CandidateAnalysis]) + Send + Sync,
{
    fn on_progress(&self, phase: ProgressPhase, status: &BatchStatus, results: &[CandidateAnalysis]) {
        self(phase, status, results)
    }
}

/// Discards every snapshot.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _phase: ProgressPhase, _status: &BatchStatus, _results: &[CandidateAnalysis]) {}
}

/// Logs each snapshot through `tracing`.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&self, phase: ProgressPhase, status: &BatchStatus, results: &[CandidateAnalysis]) {
        match (phase, results.last()) {
            (ProgressPhase::Complete, _) => info!(
                "batch complete: {}/{} analyzed, {} failed",
                status.processed,
                status.total,
                results.iter().filter(|r| r.is_sentinel()).count()
            ),
            (ProgressPhase::Analyzed, Some(last)) => info!(
                "[{}/{} {}%] {} -> {} ({})",
                status.processed,
                status.total,
                status.percent(),
                status.current_file,
                last.match_score,
                last.hiring_recommendation
            ),
            _ => info!(
                "[{}/{}] analyzing {}",
                status.processed + 1,
                status.total,
                status.current_file
            ),
        }
    }
}
