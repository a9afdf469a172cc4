// src/dag/mod.rs

//! Task dependency graph and scheduling.
//!
//! - [`task`] defines the task/target model and action descriptions.
//! - [`graph`] holds the validated task set (forward and reverse edges,
//!   cycle detection).
//! - [`state`] tracks per-run task state and the transition rules.
//! - [`scheduler`] is the per-run state machine: idempotent skip of
//!   satisfied targets, readiness, failure propagation.
//! - [`report`] summarizes terminal states for user-visible reporting.

pub mod graph;
pub mod report;
pub mod scheduler;
pub mod state;
pub mod task;

pub use graph::TaskSet;
pub use report::RunReport;
pub use scheduler::{Scheduler, SchedulerStep};
pub use state::TaskState;
pub use task::{
    AggregateSpec, CommandSpec, DepPolicy, ScheduledTask, SummaryInput, SummaryKind, Target, Task,
    TaskAction, TaskId,
};
