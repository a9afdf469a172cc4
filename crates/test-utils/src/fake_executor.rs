//! Fake executor backend for runtime tests.
//!
//! Records which tasks were dispatched and immediately reports a completion
//! event back to the runtime, without touching the filesystem or spawning
//! processes.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use rnapipe::dag::{ScheduledTask, TaskId};
use rnapipe::engine::{RuntimeEvent, TaskOutcome};
use rnapipe::errors::{Error, Result};
use rnapipe::exec::ExecutorBackend;

pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    /// Tasks dispatched so far, in dispatch order.
    executed: Arc<Mutex<Vec<TaskId>>>,
    /// Tasks that should report a failure instead of success.
    failures: HashMap<TaskId, TaskOutcome>,
    /// Scheduled tasks as seen by the executor, keyed by id.
    scheduled: Arc<Mutex<HashMap<TaskId, ScheduledTask>>>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            runtime_tx,
            executed: Arc::new(Mutex::new(Vec::new())),
            failures: HashMap::new(),
            scheduled: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Make `task` complete with the given failure outcome.
    pub fn fail_task(mut self, task: &str, outcome: TaskOutcome) -> Self {
        self.failures.insert(task.to_string(), outcome);
        self
    }

    /// Handle to the dispatch log, valid after the executor is moved into
    /// the runtime.
    pub fn executed_handle(&self) -> Arc<Mutex<Vec<TaskId>>> {
        Arc::clone(&self.executed)
    }

    /// Handle to the scheduled-task log (inspects `succeeded_deps` etc.).
    pub fn scheduled_handle(&self) -> Arc<Mutex<HashMap<TaskId, ScheduledTask>>> {
        Arc::clone(&self.scheduled)
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let scheduled = Arc::clone(&self.scheduled);
        let failures = self.failures.clone();

        Box::pin(async move {
            for task in tasks {
                executed.lock().unwrap().push(task.id.clone());

                let outcome = failures
                    .get(&task.id)
                    .cloned()
                    .unwrap_or(TaskOutcome::Success);

                let id = task.id.clone();
                scheduled.lock().unwrap().insert(task.id.clone(), task);

                tx.send(RuntimeEvent::TaskCompleted { task: id, outcome })
                    .await
                    .map_err(Error::from)?;
            }
            Ok(())
        })
    }
}
