// tests/partial_failure.rs
//
// Failure isolation across independent per-sample subtrees, failure
// propagation into the analysis stage, and the aggregators' run-anyway
// behaviour.

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use rnapipe::dag::Scheduler;
use rnapipe::engine::{CoreRuntime, Runtime, RuntimeEvent, TaskOutcome};
use rnapipe::fs::MockFileSystem;
use rnapipe::pipeline::build_pipeline;
use rnapipe_test_utils::builders::ConfigFileBuilder;
use rnapipe_test_utils::fake_executor::FakeExecutor;
use rnapipe_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn one_failed_sample_does_not_stop_the_others() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_sample("samp1", "reads/samp1.fq")
        .with_sample("samp2", "reads/samp2.fq")
        .with_sample("samp3", "reads/samp3.fq")
        .with_features(&["gene"])
        .build();
    let build = build_pipeline(&cfg)?;

    let fs = Arc::new(MockFileSystem::new());
    let scheduler = Scheduler::new(build.set, build.roots, fs)?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone())
        .fail_task("qc:samp2", TaskOutcome::ExitFailure(1));
    let executed = executor.executed_handle();
    let scheduled = executor.scheduled_handle();

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runtime.run()).await??;

    assert!(!report.overall_success());

    // The other samples' QC still ran to success.
    assert!(report.succeeded.contains(&"qc:samp1".to_string()));
    assert!(report.succeeded.contains(&"qc:samp3".to_string()));

    // The direct failure keeps its outcome.
    assert_eq!(
        report.failed,
        vec![("qc:samp2".to_string(), TaskOutcome::ExitFailure(1))]
    );

    // Analysis gated on all samples is skipped, not run and not counted as
    // a direct failure.
    assert_eq!(report.failed_upstream, vec!["dge:prok:gene".to_string()]);
    let order = executed.lock().unwrap().clone();
    assert!(!order.contains(&"dge:prok:gene".to_string()));

    // Both aggregators still ran: the QC summary over the surviving
    // samples, the DGE summary over nothing.
    assert!(report.succeeded.contains(&"qc_summary".to_string()));
    assert!(report.succeeded.contains(&"dge_summary".to_string()));

    let scheduled = scheduled.lock().unwrap();
    let mut qc_deps = scheduled
        .get("qc_summary")
        .expect("qc_summary was dispatched")
        .succeeded_deps
        .clone();
    qc_deps.sort();
    assert_eq!(qc_deps, vec!["qc:samp1".to_string(), "qc:samp3".to_string()]);

    let dge_deps = &scheduled
        .get("dge_summary")
        .expect("dge_summary was dispatched")
        .succeeded_deps;
    assert!(dge_deps.is_empty(), "no DGE task succeeded: {dge_deps:?}");

    Ok(())
}

/// A failure in one (kingdom, feature) analysis leaves the sibling
/// analyses and the QC stage untouched.
#[tokio::test]
async fn failed_dge_task_does_not_affect_siblings() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_sample("samp1", "reads/samp1.fq")
        .with_features(&["gene", "CDS"])
        .build();
    let build = build_pipeline(&cfg)?;

    let fs = Arc::new(MockFileSystem::new());
    let scheduler = Scheduler::new(build.set, build.roots, fs)?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone()).fail_task(
        "dge:prok:gene",
        TaskOutcome::MissingInput("design.txt".into()),
    );

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runtime.run()).await??;

    assert!(report.succeeded.contains(&"dge:prok:CDS".to_string()));
    assert!(report.succeeded.contains(&"dge_summary".to_string()));
    assert_eq!(
        report.failed,
        vec![(
            "dge:prok:gene".to_string(),
            TaskOutcome::MissingInput("design.txt".into())
        )]
    );
    assert!(report.failed_upstream.is_empty());

    Ok(())
}
