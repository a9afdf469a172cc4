// tests/idempotent_skip.rs
//
// Completion detection: a task whose output targets all exist is skipped,
// never dispatched, and reported separately from tasks that ran.

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use rnapipe::dag::Scheduler;
use rnapipe::engine::{CoreRuntime, Runtime, RuntimeEvent};
use rnapipe::fs::MockFileSystem;
use rnapipe::pipeline::build_pipeline;
use rnapipe_test_utils::builders::ConfigFileBuilder;
use rnapipe_test_utils::fake_executor::FakeExecutor;
use rnapipe_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn two_sample_config() -> rnapipe::config::model::ConfigFile {
    ConfigFileBuilder::new()
        .with_sample("samp1", "reads/samp1.fq")
        .with_sample("samp2", "reads/samp2.fq")
        .with_features(&["gene"])
        .build()
}

#[tokio::test]
async fn fully_satisfied_pipeline_dispatches_nothing() -> TestResult {
    init_tracing();

    let cfg = two_sample_config();
    let build = build_pipeline(&cfg)?;

    let fs = MockFileSystem::new();
    fs.add_file("pipeline_out/processes/qc/samp1/samp1.stats.txt", "");
    fs.add_file("pipeline_out/processes/qc/samp2/samp2.stats.txt", "");
    fs.add_file("pipeline_out/processes/qc/QCsummary.csv", "");
    fs.add_file("pipeline_out/processes/dge/prok/gene_summary.csv", "");
    fs.add_file("pipeline_out/processes/dge/summary_updown.csv", "");

    let scheduler = Scheduler::new(build.set, build.roots, Arc::new(fs))?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone());
    let executed = executor.executed_handle();

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runtime.run()).await??;

    assert!(executed.lock().unwrap().is_empty());
    assert!(report.overall_success());
    assert!(report.succeeded.is_empty());
    assert_eq!(report.skipped_up_to_date.len(), 5);

    Ok(())
}

/// Only the QC outputs exist: the QC tasks are skipped but still count as
/// satisfied dependencies, so the downstream stage and both aggregators
/// run.
#[tokio::test]
async fn partially_satisfied_pipeline_runs_only_missing_tasks() -> TestResult {
    init_tracing();

    let cfg = two_sample_config();
    let build = build_pipeline(&cfg)?;

    let fs = MockFileSystem::new();
    fs.add_file("pipeline_out/processes/qc/samp1/samp1.stats.txt", "");
    fs.add_file("pipeline_out/processes/qc/samp2/samp2.stats.txt", "");

    let scheduler = Scheduler::new(build.set, build.roots, Arc::new(fs))?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone());
    let executed = executor.executed_handle();
    let scheduled = executor.scheduled_handle();

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runtime.run()).await??;

    assert!(report.overall_success());

    let mut order = executed.lock().unwrap().clone();
    order.sort();
    assert_eq!(
        order,
        vec![
            "dge:prok:gene".to_string(),
            "dge_summary".to_string(),
            "qc_summary".to_string(),
        ]
    );

    let mut skipped = report.skipped_up_to_date.clone();
    skipped.sort();
    assert_eq!(skipped, vec!["qc:samp1".to_string(), "qc:samp2".to_string()]);

    // Up-to-date skips count as succeeded dependencies; the QC aggregator
    // must read both samples' stats even though neither QC task ran.
    let scheduled = scheduled.lock().unwrap();
    let mut deps = scheduled
        .get("qc_summary")
        .expect("qc_summary was dispatched")
        .succeeded_deps
        .clone();
    deps.sort();
    assert_eq!(deps, vec!["qc:samp1".to_string(), "qc:samp2".to_string()]);

    Ok(())
}
