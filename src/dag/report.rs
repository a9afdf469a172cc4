// src/dag/report.rs

//! Final run report.
//!
//! The distinction between "failed directly", "skipped because an upstream
//! dependency failed", and "skipped because the output already existed" is
//! preserved for user-visible reporting; it is never collapsed into a
//! single failure count.

use tracing::{info, warn};

use crate::dag::task::TaskId;
use crate::engine::TaskOutcome;

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Tasks that ran and succeeded.
    pub succeeded: Vec<TaskId>,
    /// Tasks whose outputs were already satisfied; never dispatched.
    pub skipped_up_to_date: Vec<TaskId>,
    /// Tasks that ran (or were about to run) and failed, with the outcome.
    pub failed: Vec<(TaskId, TaskOutcome)>,
    /// Tasks never run because an upstream dependency failed.
    pub failed_upstream: Vec<TaskId>,
    /// Tasks left non-terminal (only after an interrupted/drained run).
    pub not_finished: Vec<TaskId>,
}

impl RunReport {
    /// True iff every reachable task ended successfully, counting
    /// up-to-date skips as success.
    pub fn overall_success(&self) -> bool {
        self.failed.is_empty() && self.failed_upstream.is_empty() && self.not_finished.is_empty()
    }

    /// Log a per-category summary at the end of a run.
    pub fn log_summary(&self) {
        info!(
            succeeded = self.succeeded.len(),
            skipped_up_to_date = self.skipped_up_to_date.len(),
            failed = self.failed.len(),
            failed_upstream = self.failed_upstream.len(),
            "pipeline run finished"
        );

        for (task, outcome) in &self.failed {
            warn!(task = %task, outcome = %outcome, "task failed");
        }
        for task in &self.failed_upstream {
            warn!(task = %task, "task skipped: upstream dependency failed");
        }
        for task in &self.not_finished {
            warn!(task = %task, "task did not reach a terminal state (run interrupted)");
        }
    }
}
