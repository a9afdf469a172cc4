// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::{Scheduler, TaskAction};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent};
use crate::errors::{PipelineError, Result};
use crate::exec::RealExecutorBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{PipelineBuild, build_pipeline};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and manifest validation
/// - pipeline DAG construction
/// - scheduler / runtime / executor
/// - Ctrl-C handling (drain: no new dispatch, in-flight tasks finish)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    let build = build_pipeline(&cfg)?;

    if args.dry_run {
        print_dry_run(&cfg, &build);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let scheduler = Scheduler::new(build.set, build.roots, Arc::clone(&fs))?;

    let jobs = args.jobs.unwrap_or_else(|| cfg.effective_jobs());
    info!(jobs, samples = cfg.samples().len(), "pipeline configured");

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(rt_tx.clone(), jobs, Arc::clone(&fs));

    // Ctrl-C → graceful drain.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let core = CoreRuntime::new(scheduler);
    let runtime = Runtime::new(core, rt_rx, executor);
    let report = runtime.run().await?;

    report.log_summary();

    if report.overall_success() {
        Ok(())
    } else {
        Err(PipelineError::RunFailed {
            failed: report.failed.len(),
            propagated: report.failed_upstream.len() + report.not_finished.len(),
        })
    }
}

/// Simple dry-run output: print tasks, deps, actions and output targets.
fn print_dry_run(cfg: &ConfigFile, build: &PipelineBuild) {
    println!("rnapipe dry-run");
    println!("  workdir = {}", cfg.pipeline.workdir.display());
    println!("  jobs = {}", cfg.effective_jobs());
    println!("  samples = {}", cfg.samples().len());
    println!();

    let mut ids: Vec<&str> = build.set.ids().collect();
    ids.sort();

    println!("tasks ({}):", ids.len());
    for id in ids {
        let Some(task) = build.set.get(id) else {
            continue;
        };
        println!("  - {id}");
        println!("      action: {}", task.action.describe());
        if !task.deps.is_empty() {
            println!("      after: {:?}", task.deps);
        }
        for target in &task.outputs {
            println!("      target: {}", target.path().display());
        }
        if matches!(task.action, TaskAction::Aggregate(_)) {
            println!("      runs once all dependencies are terminal");
        }
    }

    println!();
    println!("roots: {:?}", build.roots);
}
