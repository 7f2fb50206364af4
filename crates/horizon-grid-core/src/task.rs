//! Deferred task queue.
//!
//! Tasks posted here run on the host's next turn, after the update batch that
//! posted them has completed. Views use it to publish "rows changed"
//! notifications only once their flags and row projection are consistent.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::logging::targets;

type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// A FIFO queue of deferred tasks.
struct TaskQueue {
    tasks: VecDeque<BoxedTask>,
}

impl TaskQueue {
    fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    fn post(&mut self, task: BoxedTask) -> usize {
        self.tasks.push_back(task);
        self.tasks.len()
    }

    fn pop(&mut self) -> Option<BoxedTask> {
        self.tasks.pop_front()
    }
}

/// A thread-safe task queue shared between views and their host.
///
/// The lock is released while a task runs, so tasks may post further tasks.
pub struct SharedTaskQueue {
    inner: Mutex<TaskQueue>,
}

impl SharedTaskQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TaskQueue::new()),
        }
    }

    /// Post a task to run on the next drain.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let pending = self.inner.lock().post(Box::new(task));
        tracing::trace!(target: targets::TASK, pending, "task posted");
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.lock().tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    /// Run the tasks that were pending when this call started.
    ///
    /// Tasks posted while processing stay queued for the next turn.
    /// Returns the number of tasks processed.
    pub fn process_pending(&self) -> usize {
        let count = self.pending_count();
        let mut processed = 0;
        while processed < count {
            let Some(task) = self.inner.lock().pop() else {
                break;
            };
            task();
            processed += 1;
        }
        processed
    }

    /// Run tasks until the queue is empty, including ones posted meanwhile.
    ///
    /// Returns the number of tasks processed.
    pub fn process_all(&self) -> usize {
        let mut processed = 0;
        loop {
            let next = self.inner.lock().pop();
            match next {
                Some(task) => {
                    task();
                    processed += 1;
                }
                None => break,
            }
        }
        processed
    }
}

impl Default for SharedTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
