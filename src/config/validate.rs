// src/config/validate.rs

use crate::config::manifest::{ReadSpec, SampleRecord};
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PipelineError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_global(&raw)?;
        let samples = parse_samples(&raw)?;
        Ok(ConfigFile::new_unchecked(raw, samples))
    }
}

fn validate_global(raw: &RawConfigFile) -> Result<()> {
    if raw.sample.is_empty() {
        return Err(PipelineError::ConfigError(
            "config must contain at least one [sample.<name>] section".to_string(),
        ));
    }

    if raw.pipeline.jobs == Some(0) {
        return Err(PipelineError::ConfigError(
            "[pipeline].jobs must be >= 1 (got 0)".to_string(),
        ));
    }

    if !(raw.dge.p_value > 0.0 && raw.dge.p_value <= 1.0) {
        return Err(PipelineError::ConfigError(format!(
            "[dge].p_value must be in (0, 1] (got {})",
            raw.dge.p_value
        )));
    }

    if raw.dge.features.is_empty() {
        return Err(PipelineError::ConfigError(
            "[dge].features must name at least one feature type".to_string(),
        ));
    }

    if raw.dge.kingdoms.is_empty() {
        return Err(PipelineError::ConfigError(
            "[dge].kingdoms must name at least one kingdom".to_string(),
        ));
    }

    if raw.dge.exp_design.as_os_str().is_empty() {
        return Err(PipelineError::ConfigError(
            "[dge].exp_design must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Parse every sample spec up front so a malformed manifest entry aborts
/// the pipeline before any task is constructed.
fn parse_samples(raw: &RawConfigFile) -> Result<Vec<SampleRecord>> {
    let mut samples = Vec::with_capacity(raw.sample.len());
    for (name, sample) in raw.sample.iter() {
        let reads = ReadSpec::parse(name, &sample.reads)?;
        samples.push(SampleRecord::new(name.clone(), reads));
    }
    Ok(samples)
}
