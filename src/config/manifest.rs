// src/config/manifest.rs

//! Sample manifest parsing.
//!
//! A read spec is `r1` for single-end or `r1:r2` (or `r1;r2`) for
//! paired-end reads, where each side may be a comma-separated list of
//! per-lane files. Anything else is an `InvalidManifestEntry`, raised
//! before any task is constructed.

use std::path::PathBuf;

use crate::errors::{PipelineError, Result};

/// Parsed read layout for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadSpec {
    /// One or more lane files for unpaired reads.
    SingleEnd(Vec<PathBuf>),
    /// Lane files per direction; lane counts must match.
    PairedEnd { r1: Vec<PathBuf>, r2: Vec<PathBuf> },
}

impl ReadSpec {
    pub fn parse(sample: &str, raw: &str) -> Result<Self> {
        let invalid = |reason: &str| PipelineError::InvalidManifestEntry {
            sample: sample.to_string(),
            reason: reason.to_string(),
        };

        let raw = raw.trim();
        if raw.is_empty() {
            return Err(invalid("empty read spec"));
        }

        // `;` is an accepted alias for the pair separator.
        let normalized = raw.replace(';', ":");
        let sides: Vec<&str> = normalized.split(':').collect();

        match sides.as_slice() {
            [single] => Ok(ReadSpec::SingleEnd(parse_lanes(sample, single)?)),
            [r1, r2] => {
                let r1 = parse_lanes(sample, r1)?;
                let r2 = parse_lanes(sample, r2)?;
                if r1.len() != r2.len() {
                    return Err(invalid(&format!(
                        "paired lane counts differ ({} vs {})",
                        r1.len(),
                        r2.len()
                    )));
                }
                Ok(ReadSpec::PairedEnd { r1, r2 })
            }
            _ => Err(invalid(
                "expected one path (single-end) or two `:`-separated paths (paired-end)",
            )),
        }
    }

    /// All input files named by this spec, in declaration order.
    pub fn all_inputs(&self) -> Vec<PathBuf> {
        match self {
            ReadSpec::SingleEnd(lanes) => lanes.clone(),
            ReadSpec::PairedEnd { r1, r2 } => r1.iter().chain(r2.iter()).cloned().collect(),
        }
    }

    pub fn is_paired(&self) -> bool {
        matches!(self, ReadSpec::PairedEnd { .. })
    }
}

fn parse_lanes(sample: &str, side: &str) -> Result<Vec<PathBuf>> {
    let mut lanes = Vec::new();
    for part in side.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(PipelineError::InvalidManifestEntry {
                sample: sample.to_string(),
                reason: "empty path in read spec".to_string(),
            });
        }
        lanes.push(PathBuf::from(part));
    }
    Ok(lanes)
}

/// One manifest entry: sample name plus its parsed read layout.
///
/// Immutable once loaded; shared read-only across the per-sample task
/// subtrees built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub name: String,
    pub reads: ReadSpec,
}

impl SampleRecord {
    pub fn new(name: impl Into<String>, reads: ReadSpec) -> Self {
        Self {
            name: name.into(),
            reads,
        }
    }
}
