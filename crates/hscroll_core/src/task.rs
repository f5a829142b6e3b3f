//! Task scheduling
//!
//! Microtasks run as soon as the current unit of work finishes; macrotasks
//! run on a later turn of the event loop, each followed by a microtask
//! checkpoint.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A deferred unit of work
pub type Task = Box<dyn FnOnce() + Send>;

/// Deferred execution on the host's event loop
pub trait Scheduler: Send + Sync {
    /// Run `task` at the next microtask checkpoint
    fn queue_micro_task(&self, task: Task);

    /// Run `task` on a later turn of the event loop
    fn queue_task(&self, task: Task);
}

/// Single-threaded task queue
///
/// Nothing runs until the owner drives the queue with
/// [`flush_micro_tasks`](Self::flush_micro_tasks),
/// [`run_next_task`](Self::run_next_task) or
/// [`run_until_idle`](Self::run_until_idle). Queue locks are released while
/// a task runs, so tasks can queue further work.
#[derive(Default)]
pub struct TaskQueue {
    micro: Mutex<VecDeque<Task>>,
    tasks: Mutex<VecDeque<Task>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_micro_tasks(&self) -> usize {
        lock(&self.micro).len()
    }

    pub fn pending_tasks(&self) -> usize {
        lock(&self.tasks).len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_micro_tasks() == 0 && self.pending_tasks() == 0
    }

    /// Run microtasks until none remain, including ones queued while
    /// flushing. Returns how many ran.
    pub fn flush_micro_tasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = lock(&self.micro).pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "flushed microtasks");
        }
        ran
    }

    /// Run the oldest macrotask followed by a microtask checkpoint.
    /// Returns false if there was nothing to run.
    pub fn run_next_task(&self) -> bool {
        let next = lock(&self.tasks).pop_front();
        match next {
            Some(task) => {
                task();
                self.flush_micro_tasks();
                true
            }
            None => false,
        }
    }

    /// Drain microtasks, then macrotasks until both queues are empty.
    /// Returns how many macrotasks ran.
    pub fn run_until_idle(&self) -> usize {
        self.flush_micro_tasks();
        let mut ran = 0;
        while self.run_next_task() {
            ran += 1;
        }
        ran
    }
}

impl Scheduler for TaskQueue {
    fn queue_micro_task(&self, task: Task) {
        lock(&self.micro).push_back(task);
    }

    fn queue_task(&self, task: Task) {
        lock(&self.tasks).push_back(task);
    }
}
