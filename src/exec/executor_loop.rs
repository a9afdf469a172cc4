// src/exec/executor_loop.rs

//! Background executor loop.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::exec::task_runner::run_task;
use crate::fs::FileSystem;

/// Spawn the background executor loop.
///
/// The returned sender is what [`super::RealExecutorBackend`] feeds with
/// scheduled tasks. Each task runs in its own Tokio task; a semaphore with
/// `jobs` permits bounds how many actions execute at once. The scheduler
/// guarantees a task is dispatched at most once per invocation, so no
/// per-task dedup is needed here.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    jobs: usize,
    fs: Arc<dyn FileSystem>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));

    tokio::spawn(async move {
        info!(jobs, "executor loop started");

        while let Some(task) = rx.recv().await {
            let permit_sem = Arc::clone(&semaphore);
            let rt_tx = runtime_tx.clone();
            let task_fs = Arc::clone(&fs);
            let id = task.id.clone();

            tokio::spawn(async move {
                // Closed only if the executor is being torn down.
                let Ok(_permit) = permit_sem.acquire_owned().await else {
                    return;
                };
                run_task(task, rt_tx, task_fs).await;
                debug!(task = %id, "task runner future finished");
            });
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
