// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! These cover errors raised while *building* a pipeline (config,
//! manifest, DAG shape). Failures of individual tasks at run time are not
//! errors in this sense; they are reported as [`crate::engine::TaskOutcome`]
//! values and surfaced in the final [`crate::dag::RunReport`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid manifest entry for sample '{sample}': {reason}")]
    InvalidManifestEntry { sample: String, reason: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task '{task}' depends on unknown task '{dep}'")]
    UnknownDependency { task: String, dep: String },

    #[error("Task '{task}' declares no output targets")]
    EmptyOutputs { task: String },

    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),

    #[error("Cycle detected in task DAG: {0}")]
    CyclicDependency(String),

    #[error(
        "pipeline run finished with failures: {failed} task(s) failed, \
         {propagated} skipped due to upstream failures"
    )]
    RunFailed { failed: usize, propagated: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
