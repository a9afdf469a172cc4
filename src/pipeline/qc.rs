// src/pipeline/qc.rs

//! Per-sample QC stage.
//!
//! For each sample this produces an independent task subtree:
//! - one lane-merge task per read direction when the manifest names more
//!   than one lane file,
//! - one QC task invoking the external tool, whose declared output is the
//!   per-sample statistics file used for completion detection.
//!
//! Subtrees of different samples share no targets or other mutable state,
//! which is what makes them safe to run concurrently.

use std::path::{Path, PathBuf};

use crate::config::manifest::{ReadSpec, SampleRecord};
use crate::config::model::{PipelineSection, QcSection};
use crate::dag::{CommandSpec, Target, Task, TaskAction, TaskId};

pub fn qc_task_id(sample: &str) -> TaskId {
    format!("qc:{sample}")
}

/// `<workdir>/processes/qc/<sample>`
pub fn qc_dir(workdir: &Path, sample: &str) -> PathBuf {
    workdir.join("processes").join("qc").join(sample)
}

/// The per-sample statistics file the QC tool must produce.
pub fn stats_path(workdir: &Path, sample: &str) -> PathBuf {
    qc_dir(workdir, sample).join(format!("{sample}.stats.txt"))
}

/// Build the QC subtree for one sample: zero or more lane-merge tasks plus
/// the QC task itself (last in the returned vec).
pub fn build_sample_tasks(
    sample: &SampleRecord,
    pipeline: &PipelineSection,
    qc: &QcSection,
) -> Vec<Task> {
    let dir = qc_dir(&pipeline.workdir, &sample.name);
    let mut tasks = Vec::new();
    let mut deps: Vec<TaskId> = Vec::new();

    let effective: Vec<PathBuf> = match &sample.reads {
        ReadSpec::SingleEnd(lanes) => {
            vec![lane_input(sample, "R1", lanes, &dir, &mut tasks, &mut deps)]
        }
        ReadSpec::PairedEnd { r1, r2 } => vec![
            lane_input(sample, "R1", r1, &dir, &mut tasks, &mut deps),
            lane_input(sample, "R2", r2, &dir, &mut tasks, &mut deps),
        ],
    };

    let mut args: Vec<String> = vec![
        "-min_L".into(),
        qc.min_read_length.to_string(),
        "-n".into(),
        qc.n_cutoff.to_string(),
        "-t".into(),
        qc.threads.to_string(),
        "-avg_q".into(),
        qc.avg_q.to_string(),
        "-prefix".into(),
        sample.name.clone(),
        "-d".into(),
        dir.display().to_string(),
    ];
    match effective.as_slice() {
        [single] => {
            args.push("-u".into());
            args.push(single.display().to_string());
        }
        [r1, r2] => {
            args.push("-1".into());
            args.push(r1.display().to_string());
            args.push("-2".into());
            args.push(r2.display().to_string());
        }
        _ => unreachable!("read spec always yields one or two effective files"),
    }

    tasks.push(Task {
        id: qc_task_id(&sample.name),
        deps,
        outputs: vec![Target::new(stats_path(&pipeline.workdir, &sample.name))],
        action: TaskAction::Command(CommandSpec {
            program: qc.program.clone(),
            args,
            inputs: effective,
            output_dir: dir,
        }),
        dep_policy: Default::default(),
    });

    tasks
}

/// Resolve the effective input file for one read direction, adding a merge
/// task when the manifest names multiple lanes.
fn lane_input(
    sample: &SampleRecord,
    direction: &str,
    lanes: &[PathBuf],
    dir: &Path,
    tasks: &mut Vec<Task>,
    deps: &mut Vec<TaskId>,
) -> PathBuf {
    if lanes.len() == 1 {
        return lanes[0].clone();
    }

    let merged = dir.join(format!("{}_{direction}.fastq", sample.name));
    let id = format!("merge:{}:{direction}", sample.name);
    tasks.push(Task {
        id: id.clone(),
        deps: Vec::new(),
        outputs: vec![Target::new(merged.clone())],
        action: TaskAction::MergeLanes {
            inputs: lanes.to_vec(),
            output: merged.clone(),
        },
        dep_policy: Default::default(),
    });
    deps.push(id);
    merged
}
