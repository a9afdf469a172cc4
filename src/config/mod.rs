// src/config/mod.rs

//! Configuration: TOML model, loading, validation, and sample manifest
//! parsing.

pub mod loader;
pub mod manifest;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use manifest::{ReadSpec, SampleRecord};
pub use model::{ConfigFile, DgeSection, PipelineSection, QcSection, RawConfigFile, SampleConfig};
