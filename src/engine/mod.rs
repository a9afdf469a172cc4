// src/engine/mod.rs

//! Orchestration engine.
//!
//! Ties together the DAG scheduler and the executor through a single event
//! loop:
//! - task completion events from the executor
//! - shutdown signals (Ctrl-C)
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::fmt;
use std::path::PathBuf;

use crate::dag::{ScheduledTask, TaskId};

/// Outcome of one task's execution, as reported by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// External process exited non-zero.
    ExitFailure(i32),
    /// A declared input file was absent; the action was never started.
    MissingInput(PathBuf),
    /// The action finished cleanly but a declared output target is still
    /// unsatisfied; a contract violation, distinct from exit status.
    OutputNotProduced(PathBuf),
    /// The aggregation step could not read a dependency output or write
    /// its own.
    AggregationFailure(String),
    /// Runner-internal error (spawn failure, IO error outside the above).
    Internal(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Success => write!(f, "success"),
            TaskOutcome::ExitFailure(code) => write!(f, "process exited with code {code}"),
            TaskOutcome::MissingInput(path) => {
                write!(f, "missing input file {}", path.display())
            }
            TaskOutcome::OutputNotProduced(path) => {
                write!(f, "declared output not produced: {}", path.display())
            }
            TaskOutcome::AggregationFailure(msg) => write!(f, "aggregation failed: {msg}"),
            TaskOutcome::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

/// Events flowing into the runtime from the executor and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task finished with a concrete outcome.
    TaskCompleted { task: TaskId, outcome: TaskOutcome },
    /// Graceful shutdown requested: stop dispatching, let in-flight tasks
    /// finish.
    ShutdownRequested,
}

/// Command produced by the pure core, executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

pub mod core;
pub mod runtime;

pub use core::CoreRuntime;
pub use runtime::Runtime;
