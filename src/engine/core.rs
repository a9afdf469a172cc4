// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! A synchronous, deterministic core that consumes [`RuntimeEvent`]s and
//! produces commands for the IO shell. It owns the scheduler, has no
//! channels, no Tokio types, and performs no IO, so the full run semantics
//! can be unit tested without processes or the filesystem.

use tracing::info;

use crate::dag::{RunReport, Scheduler, SchedulerStep};
use crate::engine::{CoreCommand, CoreStep, RuntimeEvent};

#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    /// Set on shutdown request: in-flight tasks finish, nothing new is
    /// dispatched.
    draining: bool,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            draining: false,
        }
    }

    /// Seed the run: skip up-to-date tasks and dispatch the initial
    /// runnable batch. If everything was already satisfied the step asks
    /// the shell to exit immediately.
    pub fn start(&mut self) -> CoreStep {
        let step = self.scheduler.start();
        self.step_to_commands(step)
    }

    /// Handle a single runtime event.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskCompleted { task, outcome } => {
                let step = self.scheduler.handle_completion(&task, outcome);
                self.step_to_commands(step)
            }
            RuntimeEvent::ShutdownRequested => {
                info!("shutdown requested; draining in-flight tasks");
                self.draining = true;
                self.scheduler.begin_drain();
                CoreStep {
                    commands: Vec::new(),
                    keep_running: self.scheduler.has_running(),
                }
            }
        }
    }

    /// Expose whether the scheduler is idle (for tests).
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Consume the core and produce the final report.
    pub fn into_report(self) -> RunReport {
        self.scheduler.report()
    }

    fn step_to_commands(&mut self, step: SchedulerStep) -> CoreStep {
        let mut commands = Vec::new();

        // While draining the scheduler stops producing new tasks, so this
        // only dispatches during a live run.
        if !step.newly_scheduled.is_empty() {
            commands.push(CoreCommand::DispatchTasks(step.newly_scheduled));
        }

        let keep_running = if self.draining {
            self.scheduler.has_running()
        } else {
            !step.run_finished
        };

        CoreStep {
            commands,
            keep_running,
        }
    }
}
