//! Round-robin driver
//!
//! A plain client of the resumption surface: it owns a set of instances,
//! resumes each of them once per tick in spawn order and runs end hooks for
//! instances that were already completed when their turn came. It adds no
//! scheduling semantics of its own; routines never see the driver.

use crate::cursor::RoutineCursor;
use crate::instance::{Instance, Resumable};
use crate::routine::Routine;
use crate::step::Step;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Driver errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("tick limit of {limit} reached with {pending} routine(s) still pending")]
    TickLimit { limit: u64, pending: usize },

    #[error("unknown task {0}")]
    UnknownTask(TaskId),
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Handle to a task spawned on a [`Driver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// When [`Driver::run`] stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Stop after the tick in which every task is completed.
    AllComplete,
    /// Stop after the tick in which this task's end hook fired, i.e. the first
    /// tick that found it already completed.
    TaskEnded(TaskId),
}

/// One task's resumption within a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStep {
    pub task: TaskId,
    pub routine: &'static str,
    pub before: RoutineCursor,
    pub after: RoutineCursor,
    pub step: Step,
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tick {
    /// 1-based tick number.
    pub number: u64,
    pub steps: Vec<TaskStep>,
}

impl Tick {
    pub fn step_of(&self, task: TaskId) -> Option<&TaskStep> {
        self.steps.iter().find(|s| s.task == task)
    }
}

/// Outcome of [`Driver::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Ticks executed by this run.
    pub ticks: u64,
    /// `(task, routine, tick)` for every task that finished during the run.
    pub completions: Vec<(TaskId, &'static str, u64)>,
}

type Hook<'a> = Box<dyn FnMut() + 'a>;

struct Task<'a> {
    routine: Box<dyn Resumable + 'a>,
    on_end: Option<Hook<'a>>,
}

// ── Driver ───────────────────────────────────────────────────────────────────

/// Resumes a set of routine instances round-robin.
#[derive(Default)]
pub struct Driver<'a> {
    tasks: Vec<Task<'a>>,
    ticks: u64,
}

impl<'a> Driver<'a> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            ticks: 0,
        }
    }

    /// Take ownership of an instance.
    pub fn spawn<R>(&mut self, instance: Instance<R>) -> TaskId
    where
        R: Routine + 'a,
        R::Frame: 'a,
    {
        self.spawn_boxed(Box::new(instance))
    }

    /// Take ownership of an instance together with its end hook.
    pub fn spawn_with_end_hook<R, F>(&mut self, instance: Instance<R>, hook: F) -> TaskId
    where
        R: Routine + 'a,
        R::Frame: 'a,
        F: FnMut() + 'a,
    {
        self.push(Box::new(instance), Some(Box::new(hook)))
    }

    /// Take ownership of an already type-erased instance.
    pub fn spawn_boxed(&mut self, routine: Box<dyn Resumable + 'a>) -> TaskId {
        self.push(routine, None)
    }

    fn push(&mut self, routine: Box<dyn Resumable + 'a>, on_end: Option<Hook<'a>>) -> TaskId {
        let id = TaskId(self.tasks.len());
        tracing::debug!(task = %id, routine = routine.name(), "spawned");
        self.tasks.push(Task { routine, on_end });
        id
    }

    /// Attach a hook that runs every time `task` is resumed after completion.
    pub fn on_end<F>(&mut self, task: TaskId, hook: F) -> DriverResult<()>
    where
        F: FnMut() + 'a,
    {
        let slot = self.task_mut(task)?;
        slot.on_end = Some(Box::new(hook));
        Ok(())
    }

    /// Resume every task once, in spawn order.
    pub fn tick(&mut self) -> Tick {
        self.ticks += 1;
        let number = self.ticks;
        let mut steps = Vec::with_capacity(self.tasks.len());

        for (index, task) in self.tasks.iter_mut().enumerate() {
            let before = task.routine.cursor();
            let step = task.routine.resume();
            let after = task.routine.cursor();
            let id = TaskId(index);

            match step {
                Step::Finished => {
                    tracing::info!(tick = number, task = %id, routine = task.routine.name(), "routine finished");
                }
                Step::Idle => {
                    if let Some(hook) = task.on_end.as_mut() {
                        hook();
                    }
                }
                Step::Suspended => {
                    tracing::debug!(tick = number, task = %id, %before, %after, "routine suspended");
                }
            }

            steps.push(TaskStep {
                task: id,
                routine: task.routine.name(),
                before,
                after,
                step,
            });
        }

        Tick { number, steps }
    }

    /// Tick until `policy` is satisfied, calling `observe` after each tick.
    ///
    /// Fails with [`DriverError::TickLimit`] if the policy is still unmet
    /// after `max_ticks` ticks of this run.
    pub fn run_with<F>(
        &mut self,
        policy: StopPolicy,
        max_ticks: u64,
        mut observe: F,
    ) -> DriverResult<RunSummary>
    where
        F: FnMut(&Tick),
    {
        if let StopPolicy::TaskEnded(task) = policy {
            self.task_mut(task)?;
        }

        let mut completions = Vec::new();
        let mut executed = 0;

        while executed < max_ticks {
            let tick = self.tick();
            executed += 1;
            observe(&tick);

            completions.extend(
                tick.steps
                    .iter()
                    .filter(|s| s.step.is_finished())
                    .map(|s| (s.task, s.routine, tick.number)),
            );

            let stop = match policy {
                StopPolicy::AllComplete => self.pending() == 0,
                StopPolicy::TaskEnded(task) => tick
                    .step_of(task)
                    .map(|s| s.step.is_idle())
                    .unwrap_or(false),
            };

            if stop {
                tracing::info!(ticks = executed, "driver stopped");
                return Ok(RunSummary {
                    ticks: executed,
                    completions,
                });
            }
        }

        let pending = self.pending();
        tracing::warn!(limit = max_ticks, pending, "tick limit reached");
        Err(DriverError::TickLimit {
            limit: max_ticks,
            pending,
        })
    }

    /// Tick until `policy` is satisfied.
    pub fn run(&mut self, policy: StopPolicy, max_ticks: u64) -> DriverResult<RunSummary> {
        self.run_with(policy, max_ticks, |_| {})
    }

    /// Force a task to completion. Its end hook fires on its next turn.
    pub fn cancel(&mut self, task: TaskId) -> DriverResult<()> {
        let slot = self.task_mut(task)?;
        slot.routine.cancel();
        tracing::debug!(task = %task, "cancelled");
        Ok(())
    }

    pub fn cursor(&self, task: TaskId) -> Option<RoutineCursor> {
        self.tasks.get(task.0).map(|t| t.routine.cursor())
    }

    /// Number of tasks that have not completed yet.
    pub fn pending(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.routine.cursor().is_completed())
            .count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Ticks executed since the driver was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn task_mut(&mut self, task: TaskId) -> DriverResult<&mut Task<'a>> {
        self.tasks
            .get_mut(task.0)
            .ok_or(DriverError::UnknownTask(task))
    }
}
