// src/exec/task_runner.rs

//! Executes a single task action and classifies the result.
//!
//! Execution contract, in order:
//! 1. every declared input must exist (`MissingInput` otherwise),
//! 2. the task's own output directory is created,
//! 3. the action runs (external process, lane merge, or aggregation),
//! 4. a non-zero exit is `ExitFailure`,
//! 5. a clean finish with an unsatisfied output target is
//!    `OutputNotProduced`, a tool contract violation rather than a
//!    success.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::{CommandSpec, ScheduledTask, TaskAction};
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::fs::FileSystem;
use crate::pipeline::summary::run_aggregation;

/// Run one scheduled task and report its outcome to the runtime.
pub async fn run_task(
    task: ScheduledTask,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    fs: Arc<dyn FileSystem>,
) {
    let id = task.id.clone();
    let outcome = execute(&task, fs.as_ref()).await;

    match &outcome {
        TaskOutcome::Success => info!(task = %id, "task completed"),
        other => error!(task = %id, outcome = %other, "task failed"),
    }

    // The runtime hanging up means the run is over; nothing left to report.
    let _ = runtime_tx
        .send(RuntimeEvent::TaskCompleted { task: id, outcome })
        .await;
}

async fn execute(task: &ScheduledTask, fs: &dyn FileSystem) -> TaskOutcome {
    for input in declared_inputs(&task.action) {
        if !fs.exists(input) {
            return TaskOutcome::MissingInput(input.to_path_buf());
        }
    }

    if let Some(dir) = output_dir(&task.action) {
        if let Err(err) = fs.create_dir_all(dir) {
            return TaskOutcome::Internal(format!("creating output dir: {err:#}"));
        }
    }

    let outcome = match &task.action {
        TaskAction::Command(spec) => run_command(&task.id, spec).await,
        TaskAction::MergeLanes { inputs, output } => match merge_lanes(inputs, output).await {
            Ok(()) => TaskOutcome::Success,
            Err(err) => TaskOutcome::Internal(format!("{err:#}")),
        },
        TaskAction::Aggregate(spec) => match run_aggregation(spec, &task.succeeded_deps, fs) {
            Ok(()) => TaskOutcome::Success,
            Err(err) => TaskOutcome::AggregationFailure(format!("{err:#}")),
        },
    };

    if !outcome.is_success() {
        return outcome;
    }

    for target in &task.outputs {
        if !target.is_satisfied(fs) {
            return TaskOutcome::OutputNotProduced(target.path().to_path_buf());
        }
    }

    TaskOutcome::Success
}

async fn run_command(id: &str, spec: &CommandSpec) -> TaskOutcome {
    info!(
        task = %id,
        program = %spec.program,
        args = ?spec.args,
        "starting external process"
    );

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            return TaskOutcome::Internal(format!(
                "spawning '{}' for task '{}': {}",
                spec.program, id, err
            ));
        }
    };

    // Consume both streams so buffers don't fill; log at debug.
    if let Some(stdout) = child.stdout.take() {
        let task_id = id.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_id, "stdout: {line}");
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        let task_id = id.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_id, "stderr: {line}");
            }
        });
    }

    let status = match child.wait().await {
        Ok(status) => status,
        Err(err) => {
            return TaskOutcome::Internal(format!("waiting for process of task '{id}': {err}"));
        }
    };

    let code = status.code().unwrap_or(-1);
    debug!(task = %id, exit_code = code, success = status.success(), "process exited");

    if status.success() {
        TaskOutcome::Success
    } else {
        TaskOutcome::ExitFailure(code)
    }
}

/// Concatenate lane files into a single read file.
///
/// Writes to a scratch sibling and renames into place, so a merge killed
/// mid-write never satisfies the output target and re-runs on the next
/// invocation.
async fn merge_lanes(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let scratch = crate::fs::scratch_path(output);

    let mut out = tokio::fs::File::create(&scratch)
        .await
        .with_context(|| format!("creating merged read file {}", scratch.display()))?;

    for input in inputs {
        let bytes = tokio::fs::read(input)
            .await
            .with_context(|| format!("reading lane file {}", input.display()))?;
        out.write_all(&bytes)
            .await
            .with_context(|| format!("writing merged read file {}", scratch.display()))?;
    }

    out.flush().await?;
    drop(out);

    tokio::fs::rename(&scratch, output)
        .await
        .with_context(|| format!("publishing merged read file {}", output.display()))?;
    Ok(())
}

fn declared_inputs(action: &TaskAction) -> &[PathBuf] {
    match action {
        TaskAction::Command(spec) => &spec.inputs,
        TaskAction::MergeLanes { inputs, .. } => inputs,
        // Aggregation inputs are dependency outputs; unreadable ones are
        // an AggregationFailure, not MissingInput.
        TaskAction::Aggregate(_) => &[],
    }
}

fn output_dir(action: &TaskAction) -> Option<&Path> {
    match action {
        TaskAction::Command(spec) => Some(&spec.output_dir),
        TaskAction::MergeLanes { output, .. } => output.parent(),
        TaskAction::Aggregate(spec) => spec.output.parent(),
    }
}
