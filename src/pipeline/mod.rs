// src/pipeline/mod.rs

//! Pipeline construction: turns a validated config into a task DAG.
//!
//! - [`qc`] builds per-sample QC subtrees (lane merge + QC tool run).
//! - [`dge`] builds per-(kingdom, feature) differential-expression tasks.
//! - [`summary`] implements the stage aggregators.
//! - [`build`] wires the stages together and picks the DAG roots.

pub mod build;
pub mod dge;
pub mod qc;
pub mod summary;

pub use build::{DGE_SUMMARY_TASK, PipelineBuild, QC_SUMMARY_TASK, build_pipeline};
