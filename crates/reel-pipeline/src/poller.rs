//! Pre-flight generation job readiness wait.
//!
//! Classifies a batch of jobs as ready or pending before the heavy
//! download fan-out begins. This stage is a latency optimization only:
//! on budget exhaustion it returns normally and the per-asset retry
//! loop stays the authority on success or failure.

use std::time::Duration;

use tracing::{info, warn};

use reel_genai::GenerationJobs;
use reel_models::{GenerationStatus, Video};

/// Budget for the pre-flight wait.
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    /// Total wall-clock time to spend waiting
    pub max_wait: Duration,
    /// Sleep between re-polls of the still-pending set
    pub poll_interval: Duration,
}

/// Outcome of the pre-flight wait.
#[derive(Debug, Default)]
pub struct PreflightReport {
    /// Indices whose jobs reported succeeded
    pub ready: Vec<usize>,
    /// Indices still pending (or erroring) when the budget ran out
    pub pending: Vec<usize>,
}

impl PreflightReport {
    pub fn all_ready(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Wait until every job is ready or the budget elapses.
///
/// A poll error counts as pending, never as fatal. Only the pending
/// set is re-polled on subsequent rounds.
pub async fn wait_for_ready(
    jobs: &dyn GenerationJobs,
    videos: &[Video],
    budget: PollBudget,
) -> PreflightReport {
    let deadline = tokio::time::Instant::now() + budget.max_wait;

    let mut report = PreflightReport::default();
    let mut pending: Vec<&Video> = Vec::new();

    for video in videos {
        if poll_once(jobs, video).await {
            report.ready.push(video.index);
        } else {
            pending.push(video);
        }
    }

    if pending.is_empty() {
        info!(count = report.ready.len(), "All videos ready before download");
        return report;
    }

    info!(pending = pending.len(), "Waiting for pending videos");

    while !pending.is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(budget.poll_interval).await;

        let mut still_pending = Vec::new();
        for video in pending {
            if poll_once(jobs, video).await {
                report.ready.push(video.index);
            } else {
                still_pending.push(video);
            }
        }
        pending = still_pending;
    }

    if !pending.is_empty() {
        warn!(
            pending = pending.len(),
            "Pre-flight budget elapsed, downloader will keep retrying"
        );
        report.pending = pending.iter().map(|v| v.index).collect();
    }

    report
}

/// Poll one job; true means ready.
async fn poll_once(jobs: &dyn GenerationJobs, video: &Video) -> bool {
    let Some(job_id) = &video.job_id else {
        // No job to wait on; the downloader will reject it
        return false;
    };

    match jobs.poll(job_id).await {
        Ok(poll) => poll.status == GenerationStatus::Succeeded,
        Err(e) => {
            warn!(index = video.index, error = %e, "Pre-flight poll error, treating as pending");
            false
        }
    }
}
