// tests/runtime_fake_executor.rs

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

/// One paired-end sample, one (kingdom, feature) pair.
fn single_sample_config() -> rnapipe::config::model::ConfigFile {
    ConfigFileBuilder::new()
        .with_sample("samp1", "reads/samp1_R1.fq:reads/samp1_R2.fq")
        .with_features(&["gene"])
        .build()
}

#[tokio::test]
async fn qc_runs_before_dge_and_aggregators_run_after_their_stage() -> TestResult {
    init_tracing();

    let cfg = single_sample_config();
    let build = build_pipeline(&cfg)?;

    let fs = Arc::new(MockFileSystem::new());
    let scheduler = Scheduler::new(build.set, build.roots, fs)?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone());
    let executed = executor.executed_handle();

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runtime.run()).await??;

    assert!(report.overall_success(), "unexpected failures: {report:?}");

    let order = executed.lock().unwrap().clone();
    let pos = |id: &str| {
        order
            .iter()
            .position(|t| t == id)
            .unwrap_or_else(|| panic!("task {id} was never dispatched; order: {order:?}"))
    };

    assert!(pos("qc:samp1") < pos("dge:prok:gene"));
    assert!(pos("qc:samp1") < pos("qc_summary"));
    assert!(pos("dge:prok:gene") < pos("dge_summary"));
    assert_eq!(order.len(), 4, "unexpected tasks dispatched: {order:?}");

    Ok(())
}

#[tokio::test]
async fn aggregator_receives_succeeded_dependencies() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_sample("samp1", "reads/samp1.fq")
        .with_sample("samp2", "reads/samp2.fq")
        .with_features(&["gene"])
        .build();
    let build = build_pipeline(&cfg)?;

    let fs = Arc::new(MockFileSystem::new());
    let scheduler = Scheduler::new(build.set, build.roots, fs)?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone());
    let scheduled = executor.scheduled_handle();

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runtime.run()).await??;
    assert!(report.overall_success());

    let scheduled = scheduled.lock().unwrap();
    let qc_summary = scheduled
        .get("qc_summary")
        .expect("qc_summary was dispatched");

    let mut deps = qc_summary.succeeded_deps.clone();
    deps.sort();
    assert_eq!(deps, vec!["qc:samp1".to_string(), "qc:samp2".to_string()]);

    Ok(())
}

/// A shutdown request received while tasks are pending must prevent any
/// further dispatch; tasks never reached stay in the report's
/// `not_finished` bucket.
#[tokio::test]
async fn shutdown_before_start_dispatches_nothing_new() -> TestResult {
    init_tracing();

    let cfg = single_sample_config();
    let build = build_pipeline(&cfg)?;

    let fs = Arc::new(MockFileSystem::new());
    let scheduler = Scheduler::new(build.set, build.roots, fs)?;

    // Capacity large enough that the executor's completion sends and our
    // shutdown send cannot deadlock.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone());
    let executed = executor.executed_handle();

    // Queue the shutdown before the runtime even starts. The initial QC
    // dispatch happens in `start()`, its completion event lands after the
    // shutdown, so nothing downstream may be dispatched.
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runtime.run()).await??;

    let order = executed.lock().unwrap().clone();
    assert_eq!(order, vec!["qc:samp1".to_string()]);

    assert!(!report.overall_success());
    assert_eq!(report.succeeded, vec!["qc:samp1".to_string()]);
    assert!(
        report.not_finished.contains(&"dge:prok:gene".to_string()),
        "expected dge task to be left unfinished: {report:?}"
    );

    Ok(())
}
