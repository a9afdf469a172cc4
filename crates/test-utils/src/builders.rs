#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use rnapipe::config::model::{
    ConfigFile, DgeSection, PipelineSection, QcSection, RawConfigFile, SampleConfig,
};
use rnapipe::dag::{CommandSpec, DepPolicy, Target, Task, TaskAction};
use rnapipe::errors::PipelineError;

/// Builder for `ConfigFile` to simplify pipeline test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                pipeline: PipelineSection::default(),
                qc: QcSection::default(),
                dge: DgeSection {
                    exp_design: PathBuf::from("design.txt"),
                    p_value: 0.05,
                    features: vec!["gene".to_string()],
                    kingdoms: vec!["prok".to_string()],
                    program: "RDESeq2".to_string(),
                },
                sample: BTreeMap::new(),
            },
        }
    }

    pub fn with_sample(mut self, name: &str, reads: &str) -> Self {
        self.config.sample.insert(
            name.to_string(),
            SampleConfig {
                reads: reads.to_string(),
            },
        );
        self
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.config.pipeline.workdir = workdir.into();
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.config.pipeline.jobs = Some(jobs);
        self
    }

    pub fn with_qc_program(mut self, program: &str) -> Self {
        self.config.qc.program = program.to_string();
        self
    }

    pub fn with_dge_program(mut self, program: &str) -> Self {
        self.config.dge.program = program.to_string();
        self
    }

    pub fn with_exp_design(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dge.exp_design = path.into();
        self
    }

    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.config.dge.features = features.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_kingdoms(mut self, kingdoms: &[&str]) -> Self {
        self.config.dge.kingdoms = kingdoms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_p_value(mut self, p: f64) -> Self {
        self.config.dge.p_value = p;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }

    /// Validation-error path for tests asserting on rejection.
    pub fn try_build(self) -> Result<ConfigFile, PipelineError> {
        ConfigFile::try_from(self.config)
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Task`, for scheduler-level tests that don't need the full
/// pipeline construction.
pub struct TaskBuilder {
    id: String,
    deps: Vec<String>,
    outputs: Vec<Target>,
    action: Option<TaskAction>,
    dep_policy: DepPolicy,
}

impl TaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            deps: Vec::new(),
            outputs: Vec::new(),
            action: None,
            dep_policy: DepPolicy::AllSucceeded,
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.deps.push(dep.to_string());
        self
    }

    pub fn output(mut self, path: &str) -> Self {
        self.outputs.push(Target::new(path));
        self
    }

    pub fn action(mut self, action: TaskAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn policy(mut self, policy: DepPolicy) -> Self {
        self.dep_policy = policy;
        self
    }

    pub fn build(self) -> Task {
        let outputs = if self.outputs.is_empty() {
            vec![Target::new(format!("targets/{}.done", self.id))]
        } else {
            self.outputs
        };

        let action = self.action.unwrap_or_else(|| {
            TaskAction::Command(CommandSpec {
                program: "true".to_string(),
                args: Vec::new(),
                inputs: Vec::new(),
                output_dir: PathBuf::from("."),
            })
        });

        Task {
            id: self.id,
            deps: self.deps,
            outputs,
            action,
            dep_policy: self.dep_policy,
        }
    }
}
