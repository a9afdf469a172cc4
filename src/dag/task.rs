// src/dag/task.rs

//! Task and target model.
//!
//! A [`Task`] is a node in the dependency graph: it declares upstream task
//! ids, one or more output [`Target`]s, and an action describing the work.
//! A task is *complete* iff every output target is satisfied; completion is
//! what lets the scheduler skip work that already happened in a previous
//! invocation.

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;

/// Canonical task identifier, e.g. `"qc:samp1"` or `"dge:prok:gene"`.
pub type TaskId = String;

/// Handle to a persisted artifact used for completion detection.
///
/// Satisfaction is a pure function of filesystem state and is re-evaluated
/// on every call; a partial file left by an interrupted run simply makes
/// the owning task incomplete again on the next invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    path: PathBuf,
}

impl Target {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the artifact currently exists. A missing parent directory is
    /// "not satisfied", never an error.
    pub fn is_satisfied(&self, fs: &dyn FileSystem) -> bool {
        fs.exists(&self.path)
    }
}

/// External process invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Files that must exist before the process is started.
    pub inputs: Vec<PathBuf>,
    /// Directory the process writes into; created before spawning.
    pub output_dir: PathBuf,
}

/// Which summary format an aggregation task produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    /// Per-sample QC statistics files merged into one QC summary table.
    QcStats,
    /// Per-feature differential-expression tables merged into one
    /// up/down-regulation summary.
    DgeTable,
}

/// One input artifact for an aggregation task.
#[derive(Debug, Clone)]
pub struct SummaryInput {
    /// Task that produces this artifact; aggregation only reads inputs
    /// whose source ended the run successfully.
    pub source: TaskId,
    /// Row key components (QC: `[sample]`, DGE: `[kingdom, feature]`).
    pub key: Vec<String>,
    pub path: PathBuf,
}

/// Aggregation work description.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub kind: SummaryKind,
    /// Inputs in deterministic (manifest / build) order.
    pub inputs: Vec<SummaryInput>,
    pub output: PathBuf,
}

/// The work a task performs when it runs.
#[derive(Debug, Clone)]
pub enum TaskAction {
    /// Invoke an external program and wait for it to exit.
    Command(CommandSpec),
    /// Concatenate multi-lane read files into a single file.
    MergeLanes {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
    /// Merge dependency outputs into a stage summary table.
    Aggregate(AggregateSpec),
}

impl TaskAction {
    /// Short human-readable description for dry-run output and logs.
    pub fn describe(&self) -> String {
        match self {
            TaskAction::Command(spec) => {
                format!("{} {}", spec.program, spec.args.join(" "))
            }
            TaskAction::MergeLanes { inputs, output } => {
                format!("merge {} lane file(s) -> {}", inputs.len(), output.display())
            }
            TaskAction::Aggregate(spec) => {
                let kind = match spec.kind {
                    SummaryKind::QcStats => "qc stats",
                    SummaryKind::DgeTable => "dge tables",
                };
                format!(
                    "aggregate {} from {} input(s) -> {}",
                    kind,
                    spec.inputs.len(),
                    spec.output.display()
                )
            }
        }
    }
}

/// When a task's dependencies count as satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepPolicy {
    /// Every dependency must have succeeded (or been skipped as already
    /// complete). Upstream failure cascades to this task.
    #[default]
    AllSucceeded,
    /// Every dependency must merely have reached a terminal state. Used by
    /// aggregators, which run over whatever subtrees survived.
    AllTerminal,
}

/// A node in the dependency graph.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub deps: Vec<TaskId>,
    pub outputs: Vec<Target>,
    pub action: TaskAction,
    pub dep_policy: DepPolicy,
}

impl Task {
    /// True iff every declared output target is satisfied.
    pub fn is_complete(&self, fs: &dyn FileSystem) -> bool {
        self.outputs.iter().all(|t| t.is_satisfied(fs))
    }
}

/// Description of a task the scheduler wants the executor to run now.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub action: TaskAction,
    /// Re-checked by the runner after the action finishes; an unsatisfied
    /// target after a clean exit is a contract violation.
    pub outputs: Vec<Target>,
    /// Dependencies that ended the run successfully (ran or were skipped
    /// as up to date). Aggregation reads only these sources.
    pub succeeded_deps: Vec<TaskId>,
}

impl ScheduledTask {
    pub fn from_task(task: &Task, succeeded_deps: Vec<TaskId>) -> Self {
        Self {
            id: task.id.clone(),
            action: task.action.clone(),
            outputs: task.outputs.clone(),
            succeeded_deps,
        }
    }
}
