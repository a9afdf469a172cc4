// src/pipeline/build.rs

//! Assemble the full pipeline DAG from a validated config.
//!
//! Fan-out: one independent QC subtree per sample, one DGE task per
//! (kingdom, feature), plus one aggregator per stage. The aggregators are
//! the DAG roots.

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::dag::{
    AggregateSpec, DepPolicy, SummaryInput, SummaryKind, Target, Task, TaskAction, TaskId, TaskSet,
};
use crate::errors::Result;
use crate::pipeline::{dge, qc};

pub const QC_SUMMARY_TASK: &str = "qc_summary";
pub const DGE_SUMMARY_TASK: &str = "dge_summary";

/// A validated task set plus the root task ids to schedule from.
#[derive(Debug, Clone)]
pub struct PipelineBuild {
    pub set: TaskSet,
    pub roots: Vec<TaskId>,
}

pub fn build_pipeline(cfg: &ConfigFile) -> Result<PipelineBuild> {
    let workdir = &cfg.pipeline.workdir;
    let mut tasks: Vec<Task> = Vec::new();

    // Stage 1: per-sample QC subtrees, in manifest order.
    let mut qc_ids: Vec<TaskId> = Vec::new();
    let mut qc_inputs: Vec<SummaryInput> = Vec::new();

    for sample in cfg.samples() {
        let subtree = qc::build_sample_tasks(sample, &cfg.pipeline, &cfg.qc);
        debug!(sample = %sample.name, tasks = subtree.len(), "built QC subtree");

        let id = qc::qc_task_id(&sample.name);
        qc_inputs.push(SummaryInput {
            source: id.clone(),
            key: vec![sample.name.clone()],
            path: qc::stats_path(workdir, &sample.name),
        });
        qc_ids.push(id);
        tasks.extend(subtree);
    }

    tasks.push(Task {
        id: QC_SUMMARY_TASK.to_string(),
        deps: qc_ids.clone(),
        outputs: vec![Target::new(
            workdir.join("processes").join("qc").join("QCsummary.csv"),
        )],
        action: TaskAction::Aggregate(AggregateSpec {
            kind: SummaryKind::QcStats,
            inputs: qc_inputs,
            output: workdir.join("processes").join("qc").join("QCsummary.csv"),
        }),
        dep_policy: DepPolicy::AllTerminal,
    });

    // Stage 2: per-(kingdom, feature) DGE tasks, gated on all QC tasks.
    let mut dge_ids: Vec<TaskId> = Vec::new();
    let mut dge_inputs: Vec<SummaryInput> = Vec::new();

    for kingdom in &cfg.dge.kingdoms {
        for feature in &cfg.dge.features {
            let task = dge::build_dge_task(kingdom, feature, &cfg.pipeline, &cfg.dge, &qc_ids);
            dge_inputs.push(SummaryInput {
                source: task.id.clone(),
                key: vec![kingdom.clone(), feature.clone()],
                path: dge::feature_summary_path(workdir, kingdom, feature),
            });
            dge_ids.push(task.id.clone());
            tasks.push(task);
        }
    }

    tasks.push(Task {
        id: DGE_SUMMARY_TASK.to_string(),
        deps: dge_ids,
        outputs: vec![Target::new(
            workdir
                .join("processes")
                .join("dge")
                .join("summary_updown.csv"),
        )],
        action: TaskAction::Aggregate(AggregateSpec {
            kind: SummaryKind::DgeTable,
            inputs: dge_inputs,
            output: workdir
                .join("processes")
                .join("dge")
                .join("summary_updown.csv"),
        }),
        dep_policy: DepPolicy::AllTerminal,
    });

    let set = TaskSet::new(tasks)?;

    Ok(PipelineBuild {
        set,
        roots: vec![QC_SUMMARY_TASK.to_string(), DGE_SUMMARY_TASK.to_string()],
    })
}
