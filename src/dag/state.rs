// src/dag/state.rs

//! Per-run task state and the transition bookkeeping shared by the
//! scheduler entry points.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskSet;
use crate::dag::task::{DepPolicy, ScheduledTask, TaskId};

/// State of a task within the current run (internal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// In the dependency closure, waiting on dependencies.
    Pending,
    /// Dispatched to the executor.
    Running,
    /// Ran and completed successfully.
    DoneSuccess,
    /// Ran and failed (process exit, missing input, contract violation).
    DoneFailed,
    /// Never ran: an upstream dependency failed.
    FailedUpstream,
    /// Never ran: all output targets were already satisfied at traversal
    /// time (idempotent skip).
    SkippedUpToDate,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Pending | RunState::Running)
    }

    /// Terminal and counts as a satisfied dependency.
    pub fn is_success(self) -> bool {
        matches!(self, RunState::DoneSuccess | RunState::SkippedUpToDate)
    }
}

/// Public, read-only view of a task's state.
///
/// Exposed for tests and diagnostics; `NotReached` covers tasks outside
/// the dependency closure of the chosen roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    NotReached,
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
    FailedUpstream,
    SkippedUpToDate,
}

impl From<Option<RunState>> for TaskState {
    fn from(state: Option<RunState>) -> Self {
        match state {
            None => TaskState::NotReached,
            Some(RunState::Pending) => TaskState::Pending,
            Some(RunState::Running) => TaskState::Running,
            Some(RunState::DoneSuccess) => TaskState::DoneSuccess,
            Some(RunState::DoneFailed) => TaskState::DoneFailed,
            Some(RunState::FailedUpstream) => TaskState::FailedUpstream,
            Some(RunState::SkippedUpToDate) => TaskState::SkippedUpToDate,
        }
    }
}

/// Manages state transitions over the reachable task map.
pub struct StateManager<'a> {
    set: &'a TaskSet,
    states: &'a mut HashMap<TaskId, RunState>,
}

impl<'a> StateManager<'a> {
    pub fn new(set: &'a TaskSet, states: &'a mut HashMap<TaskId, RunState>) -> Self {
        Self { set, states }
    }

    /// Whether the dependencies of `id` are satisfied under its policy.
    pub fn deps_satisfied(&self, id: &str) -> bool {
        let Some(task) = self.set.get(id) else {
            return false;
        };

        task.deps.iter().all(|dep| {
            let state = match self.states.get(dep) {
                Some(s) => *s,
                None => {
                    // Every dependency of a reachable task is itself
                    // reachable; a miss here means the closure is broken.
                    warn!(task = %id, dep = %dep, "dependency missing from run state map");
                    return false;
                }
            };

            match task.dep_policy {
                DepPolicy::AllSucceeded => state.is_success(),
                DepPolicy::AllTerminal => state.is_terminal(),
            }
        })
    }

    /// Collect `Pending` tasks whose dependencies are satisfied, mark them
    /// `Running`, and return them as [`ScheduledTask`]s.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        // Decide first, then mutate to avoid borrowing issues.
        let mut candidates: Vec<TaskId> = self
            .states
            .iter()
            .filter_map(|(id, state)| {
                if matches!(state, RunState::Pending) && self.deps_satisfied(id) {
                    Some(id.clone())
                } else {
                    None
                }
            })
            .collect();
        candidates.sort();

        let mut ready = Vec::new();
        for id in candidates {
            let Some(task) = self.set.get(&id) else {
                continue;
            };

            let succeeded_deps: Vec<TaskId> = task
                .deps
                .iter()
                .filter(|dep| {
                    self.states
                        .get(dep.as_str())
                        .is_some_and(|s| s.is_success())
                })
                .cloned()
                .collect();

            info!(task = %id, "dependencies satisfied; dispatching");
            self.states.insert(id.clone(), RunState::Running);
            ready.push(ScheduledTask::from_task(task, succeeded_deps));
        }

        ready
    }

    /// Mark all transitive dependents of a failed task as `FailedUpstream`
    /// without running them.
    ///
    /// Dependents with [`DepPolicy::AllTerminal`] are left `Pending`; they
    /// become runnable once all their dependencies are terminal.
    ///
    /// Returns the tasks newly marked as failed (excluding the root).
    pub fn mark_dependents_failed(&mut self, failed_task: &str) -> Vec<TaskId> {
        let mut stack: Vec<TaskId> = self.set.dependents_of(failed_task).to_vec();
        let mut newly_failed = Vec::new();

        while let Some(id) = stack.pop() {
            let Some(task) = self.set.get(&id) else {
                continue;
            };
            if task.dep_policy == DepPolicy::AllTerminal {
                continue;
            }

            match self.states.get(&id) {
                Some(RunState::Pending) => {
                    debug!(
                        task = %id,
                        upstream = %failed_task,
                        "marking dependent as failed due to upstream failure"
                    );
                    self.states.insert(id.clone(), RunState::FailedUpstream);
                    stack.extend(self.set.dependents_of(&id).iter().cloned());
                    newly_failed.push(id);
                }
                // Already terminal, already running, or not reachable from
                // the roots of this run.
                _ => {}
            }
        }

        newly_failed.sort();
        newly_failed
    }
}
