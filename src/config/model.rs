// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::config::manifest::SampleRecord;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [pipeline]
/// workdir = "pipeline_out"
/// jobs = 4
///
/// [qc]
/// min_read_length = 50
/// n_cutoff = 5
///
/// [dge]
/// exp_design = "design.txt"
/// p_value = 0.05
/// features = ["gene", "CDS"]
///
/// [sample.samp1]
/// reads = "samp1_R1.fq:samp1_R2.fq"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub pipeline: PipelineSection,

    #[serde(default)]
    pub qc: QcSection,

    pub dge: DgeSection,

    /// All samples from `[sample.<name>]`. Keys are sample names; BTreeMap
    /// gives a stable manifest order.
    #[serde(default)]
    pub sample: BTreeMap<String, SampleConfig>,
}

/// `[pipeline]` section: run-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    /// Work directory; all stage outputs live under
    /// `<workdir>/processes/<stage>/...`.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    /// Maximum number of concurrently running tasks. `None` means one per
    /// available processing unit.
    #[serde(default)]
    pub jobs: Option<usize>,
}

fn default_workdir() -> PathBuf {
    PathBuf::from("pipeline_out")
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            workdir: default_workdir(),
            jobs: None,
        }
    }
}

/// `[qc]` section: parameters passed to the external QC tool.
#[derive(Debug, Clone, Deserialize)]
pub struct QcSection {
    /// Minimum read length to keep (`-min_L`).
    #[serde(default = "default_min_read_length")]
    pub min_read_length: u32,

    /// Maximum number of N bases tolerated (`-n`).
    #[serde(default = "default_n_cutoff")]
    pub n_cutoff: u32,

    /// Average-quality cutoff (`-avg_q`).
    #[serde(default = "default_avg_q")]
    pub avg_q: u32,

    /// Thread hint passed to the tool (`-t`); independent of the
    /// pipeline-level `jobs` bound.
    #[serde(default = "default_qc_threads")]
    pub threads: u32,

    /// QC program name; overridable so tests can substitute a stub.
    #[serde(default = "default_qc_program")]
    pub program: String,
}

fn default_min_read_length() -> u32 {
    50
}

fn default_n_cutoff() -> u32 {
    5
}

fn default_avg_q() -> u32 {
    20
}

fn default_qc_threads() -> u32 {
    1
}

fn default_qc_program() -> String {
    "FaQCs".to_string()
}

impl Default for QcSection {
    fn default() -> Self {
        Self {
            min_read_length: default_min_read_length(),
            n_cutoff: default_n_cutoff(),
            avg_q: default_avg_q(),
            threads: default_qc_threads(),
            program: default_qc_program(),
        }
    }
}

/// `[dge]` section: parameters for the differential-expression stage.
#[derive(Debug, Clone, Deserialize)]
pub struct DgeSection {
    /// Experiment design file handed to the tool (`-e`).
    pub exp_design: PathBuf,

    /// Significance threshold (`-p`).
    #[serde(default = "default_p_value")]
    pub p_value: f64,

    /// Feature types to analyze; one task per (kingdom, feature).
    #[serde(default = "default_features")]
    pub features: Vec<String>,

    #[serde(default = "default_kingdoms")]
    pub kingdoms: Vec<String>,

    /// DGE program name; overridable so tests can substitute a stub.
    #[serde(default = "default_dge_program")]
    pub program: String,
}

fn default_p_value() -> f64 {
    0.05
}

fn default_features() -> Vec<String> {
    vec!["gene".to_string(), "CDS".to_string()]
}

fn default_kingdoms() -> Vec<String> {
    vec!["prok".to_string()]
}

fn default_dge_program() -> String {
    "RDESeq2".to_string()
}

/// `[sample.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SampleConfig {
    /// Raw read spec: `r1.fq` (single-end) or `r1.fq:r2.fq` (paired-end),
    /// with comma-separated lane files per side. `;` is accepted as an
    /// alternative pair separator.
    pub reads: String,
}

/// Validated configuration.
///
/// Produced only via `TryFrom<RawConfigFile>` (see `config::validate`),
/// which guarantees every sample spec parsed and global settings are sane.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub pipeline: PipelineSection,
    pub qc: QcSection,
    pub dge: DgeSection,
    samples: Vec<SampleRecord>,
}

impl ConfigFile {
    /// Construct without re-validating; only `config::validate` calls this.
    pub(crate) fn new_unchecked(raw: RawConfigFile, samples: Vec<SampleRecord>) -> Self {
        Self {
            pipeline: raw.pipeline,
            qc: raw.qc,
            dge: raw.dge,
            samples,
        }
    }

    /// Samples in manifest order.
    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    /// Effective concurrency bound.
    pub fn effective_jobs(&self) -> usize {
        self.pipeline.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
