// src/pipeline/dge.rs

//! Differential-expression stage.
//!
//! One task per (kingdom, feature type), each invoking the external DGE
//! tool on the feature-count table for that kingdom. The count table and
//! experiment design file are declared inputs; a missing one fails the
//! task before the tool is started.

use std::path::{Path, PathBuf};

use crate::config::model::{DgeSection, PipelineSection};
use crate::dag::{CommandSpec, Target, Task, TaskAction, TaskId};

pub fn dge_task_id(kingdom: &str, feature: &str) -> TaskId {
    format!("dge:{kingdom}:{feature}")
}

/// `<workdir>/processes/dge/<kingdom>`
pub fn dge_dir(workdir: &Path, kingdom: &str) -> PathBuf {
    workdir.join("processes").join("dge").join(kingdom)
}

/// Feature-count table consumed by the tool, produced upstream of this
/// pipeline.
pub fn count_table_path(workdir: &Path, kingdom: &str, feature: &str) -> PathBuf {
    workdir
        .join("processes")
        .join("featureCounts")
        .join(kingdom)
        .join(format!("{feature}_count.tsv"))
}

/// Per-feature summary table the tool must produce.
pub fn feature_summary_path(workdir: &Path, kingdom: &str, feature: &str) -> PathBuf {
    dge_dir(workdir, kingdom).join(format!("{feature}_summary.csv"))
}

/// Build the DGE task for one (kingdom, feature) pair.
///
/// `qc_deps` is the full set of per-sample QC tasks: the analysis stage
/// never starts before every sample's QC reached success.
pub fn build_dge_task(
    kingdom: &str,
    feature: &str,
    pipeline: &PipelineSection,
    dge: &DgeSection,
    qc_deps: &[TaskId],
) -> Task {
    let workdir = &pipeline.workdir;
    let dir = dge_dir(workdir, kingdom);
    let count_table = count_table_path(workdir, kingdom, feature);

    let args: Vec<String> = vec![
        "-r".into(),
        count_table.display().to_string(),
        "-e".into(),
        dge.exp_design.display().to_string(),
        "-p".into(),
        dge.p_value.to_string(),
        "-n".into(),
        feature.to_string(),
        "-o".into(),
        dir.display().to_string(),
    ];

    Task {
        id: dge_task_id(kingdom, feature),
        deps: qc_deps.to_vec(),
        outputs: vec![Target::new(feature_summary_path(workdir, kingdom, feature))],
        action: TaskAction::Command(CommandSpec {
            program: dge.program.clone(),
            args,
            inputs: vec![count_table, dge.exp_design.clone()],
            output_dir: dir,
        }),
        dep_policy: Default::default(),
    }
}
