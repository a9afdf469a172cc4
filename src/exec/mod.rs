// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs the actions the scheduler dispatches (external tool invocations
//! via `tokio::process::Command`, lane merges, summary aggregation) and
//! reports back to the runtime via `RuntimeEvent`s.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `RealExecutorBackend` used in production; tests substitute a fake.
//! - [`executor_loop`] owns the background loop and the concurrency bound.
//! - [`task_runner`] executes a single task action and classifies its
//!   outcome.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
