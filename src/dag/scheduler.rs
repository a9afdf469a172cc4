// src/dag/scheduler.rs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskSet;
use crate::dag::report::RunReport;
use crate::dag::state::{RunState, StateManager, TaskState};
use crate::dag::task::{ScheduledTask, TaskId};
use crate::engine::TaskOutcome;
use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;

/// Structured result of a single scheduler step.
///
/// Tests that manually step the DAG use this to assert exactly what
/// changed.
#[derive(Debug, Clone)]
pub struct SchedulerStep {
    /// Tasks that became ready to run as a result of this step.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// Tasks newly marked as failed (the failing task plus any dependents
    /// failed by propagation).
    pub newly_failed: Vec<TaskId>,
    /// Whether every reachable task is now terminal.
    pub run_finished: bool,
}

/// One-shot scheduler: holds the immutable task set plus per-run state.
///
/// Responsibilities:
/// - compute the dependency closure of the root tasks
/// - skip tasks whose outputs are already satisfied (idempotence)
/// - decide when a task is ready (deps satisfied under its policy)
/// - fail dependents of a failed task without running them
/// - report per-task terminal states when the run ends
#[derive(Debug)]
pub struct Scheduler {
    set: TaskSet,
    roots: Vec<TaskId>,
    fs: Arc<dyn FileSystem>,
    states: HashMap<TaskId, RunState>,
    failures: HashMap<TaskId, TaskOutcome>,
    started: bool,
    draining: bool,
}

impl Scheduler {
    pub fn new(set: TaskSet, roots: Vec<TaskId>, fs: Arc<dyn FileSystem>) -> Result<Self> {
        for root in &roots {
            if set.get(root).is_none() {
                return Err(PipelineError::TaskNotFound(root.clone()));
            }
        }

        Ok(Self {
            set,
            roots,
            fs,
            states: HashMap::new(),
            failures: HashMap::new(),
            started: false,
            draining: false,
        })
    }

    /// Begin the run: traverse the closure, skip up-to-date tasks, and
    /// return the initial batch of runnable tasks.
    ///
    /// Completion is checked once, here; it is not re-evaluated when a
    /// dependency finishes later in the run.
    pub fn start(&mut self) -> SchedulerStep {
        debug_assert!(!self.started, "scheduler started twice");
        self.started = true;

        let reachable = self.dependency_closure();
        info!(
            roots = ?self.roots,
            reachable = reachable.len(),
            total = self.set.len(),
            "scheduler: starting run"
        );

        for id in &reachable {
            let task = self
                .set
                .get(id)
                .expect("closure only contains known tasks");
            if task.is_complete(self.fs.as_ref()) {
                debug!(task = %id, "outputs already satisfied; skipping");
                self.states.insert(id.clone(), RunState::SkippedUpToDate);
            } else {
                self.states.insert(id.clone(), RunState::Pending);
            }
        }

        let newly_scheduled = self.collect_ready();
        let run_finished = self.is_idle();

        SchedulerStep {
            newly_scheduled,
            newly_failed: Vec::new(),
            run_finished,
        }
    }

    /// Stop scheduling new tasks; ready tasks stay `Pending` and end the
    /// run as `not_finished`. In-flight tasks are unaffected.
    pub fn begin_drain(&mut self) {
        info!("scheduler: draining; no new tasks will be scheduled");
        self.draining = true;
    }

    fn collect_ready(&mut self) -> Vec<ScheduledTask> {
        if self.draining {
            return Vec::new();
        }
        let mut manager = StateManager::new(&self.set, &mut self.states);
        manager.collect_new_ready_tasks()
    }

    /// Handle a task reaching a concrete outcome.
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        match self.states.get(task) {
            Some(RunState::Running) => {}
            other => {
                warn!(task = %task, state = ?other, "completion for task not running; ignoring");
                return SchedulerStep {
                    newly_scheduled: Vec::new(),
                    newly_failed: Vec::new(),
                    run_finished: self.is_idle(),
                };
            }
        }

        let mut newly_failed = Vec::new();

        if outcome.is_success() {
            debug!(task = %task, "task completed successfully");
            self.states.insert(task.to_string(), RunState::DoneSuccess);
        } else {
            warn!(task = %task, outcome = %outcome, "task failed; failing dependents");
            self.states.insert(task.to_string(), RunState::DoneFailed);
            self.failures.insert(task.to_string(), outcome);
            newly_failed.push(task.to_string());

            let mut manager = StateManager::new(&self.set, &mut self.states);
            let mut propagated = manager.mark_dependents_failed(task);
            newly_failed.append(&mut propagated);
        }

        let newly_scheduled = self.collect_ready();
        let run_finished = self.is_idle();

        if run_finished {
            info!("scheduler: all reachable tasks terminal; run finished");
        }

        SchedulerStep {
            newly_scheduled,
            newly_failed,
            run_finished,
        }
    }

    /// Whether the run has started and every reachable task is terminal.
    pub fn is_idle(&self) -> bool {
        self.started
            && !self
                .states
                .values()
                .any(|s| matches!(s, RunState::Pending | RunState::Running))
    }

    /// Whether any task is currently dispatched to the executor.
    pub fn has_running(&self) -> bool {
        self.states
            .values()
            .any(|s| matches!(s, RunState::Running))
    }

    /// Read-only view of one task's state.
    pub fn state_of(&self, task: &str) -> TaskState {
        self.states.get(task).copied().into()
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.set.ids()
    }

    /// Summarize terminal states; meaningful once [`Self::is_idle`] holds,
    /// or after a drain where remaining tasks stay non-terminal.
    pub fn report(&self) -> RunReport {
        let mut report = RunReport::default();

        let mut ids: Vec<&TaskId> = self.states.keys().collect();
        ids.sort();

        for id in ids {
            match self.states[id] {
                RunState::DoneSuccess => report.succeeded.push(id.clone()),
                RunState::SkippedUpToDate => report.skipped_up_to_date.push(id.clone()),
                RunState::FailedUpstream => report.failed_upstream.push(id.clone()),
                RunState::DoneFailed => {
                    // handle_completion records the outcome before marking
                    // a task DoneFailed.
                    let outcome = self
                        .failures
                        .get(id)
                        .cloned()
                        .expect("failed task always has a recorded outcome");
                    report.failed.push((id.clone(), outcome));
                }
                RunState::Pending | RunState::Running => {
                    report.not_finished.push(id.clone());
                }
            }
        }

        report
    }

    /// Transitive dependency closure of the roots, in discovery order.
    fn dependency_closure(&self) -> Vec<TaskId> {
        let mut visited: HashSet<TaskId> = HashSet::new();
        let mut order: Vec<TaskId> = Vec::new();
        let mut stack: Vec<TaskId> = self.roots.clone();

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            stack.extend(self.set.dependencies_of(&id).iter().cloned());
            order.push(id);
        }

        order
    }
}
