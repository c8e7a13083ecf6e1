//! A fixed-size worker pool draining a shared FIFO task queue, with a `finish` barrier
//! driven by an in-flight task counter (not just queue depth) so that tasks which
//! themselves enqueue further tasks are still awaited correctly.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Inner {
    jobs: VecDeque<Job>,
    pending: usize,
    closed: bool,
}

/// A fixed-size pool of worker threads consuming a FIFO of tasks.
pub struct WorkQueue {
    inner: Mutex<Inner>,
    has_work: Condvar,
    drained: Condvar,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkQueue {
    /// Spawn `threads` worker threads draining this queue.
    pub fn new(threads: usize) -> Arc<WorkQueue> {
        let queue = Arc::new(WorkQueue {
            inner: Mutex::new(Inner { jobs: VecDeque::new(), pending: 0, closed: false }),
            has_work: Condvar::new(),
            drained: Condvar::new(),
            workers: Mutex::new(Vec::new()),
        });

        let mut handles = Vec::with_capacity(threads.max(1));
        for _ in 0..threads.max(1) {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || queue.worker_loop()));
        }
        *queue.workers.lock().unwrap() = handles;
        queue
    }

    /// Append a task and wake one worker. Increments the pending-task counter.
    pub fn execute(&self, task: impl FnOnce() + Send + 'static) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            tracing::warn!("work queue is shut down; dropping submitted task");
            return;
        }
        inner.jobs.push_back(Box::new(task));
        inner.pending += 1;
        self.has_work.notify_one();
    }

    /// Block the calling thread until the queue is empty and all in-flight tasks
    /// (including those enqueued by other tasks) have completed.
    pub fn finish(&self) {
        let inner = self.inner.lock().unwrap();
        let _guard = self
            .drained
            .wait_while(inner, |inner| inner.pending > 0)
            .unwrap();
    }

    /// Mark the queue closed; workers exit once drained. Idempotent.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        self.has_work.notify_all();
    }

    /// Number of tasks submitted but not yet completed.
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().pending
    }

    fn worker_loop(&self) {
        loop {
            let job = {
                let mut inner = self.inner.lock().unwrap();
                loop {
                    if let Some(job) = inner.jobs.pop_front() {
                        break Some(job);
                    }
                    if inner.closed {
                        break None;
                    }
                    inner = self.has_work.wait(inner).unwrap();
                }
            };

            let Some(job) = job else { break };

            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
                tracing::warn!(?panic, "task panicked; pool continues");
            }

            let mut inner = self.inner.lock().unwrap();
            inner.pending = inner.pending.saturating_sub(1);
            if inner.pending == 0 {
                self.drained.notify_all();
            }
        }
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
        let mut handles = self.workers.lock().unwrap();
        for handle in handles.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn finish_waits_for_all_submitted_tasks() {
        let queue = WorkQueue::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            queue.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.finish();
        assert_eq!(counter.load(Ordering::SeqCst), 50);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn finish_awaits_tasks_enqueued_by_other_tasks() {
        let queue = WorkQueue::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        let queue_for_task = Arc::clone(&queue);
        let counter_for_task = Arc::clone(&counter);
        queue.execute(move || {
            counter_for_task.fetch_add(1, Ordering::SeqCst);
            let counter_inner = Arc::clone(&counter_for_task);
            queue_for_task.execute(move || {
                counter_inner.fetch_add(1, Ordering::SeqCst);
            });
        });

        queue.finish();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shutdown_is_idempotent_and_workers_exit() {
        let queue = WorkQueue::new(2);
        queue.shutdown();
        queue.shutdown();
        // Submitting after shutdown is dropped, not an error.
        queue.execute(|| panic!("should never run"));
    }

    #[test]
    fn a_panicking_task_does_not_poison_the_pool() {
        let queue = WorkQueue::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        queue.execute(|| panic!("boom"));
        let counter_clone = Arc::clone(&counter);
        queue.execute(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        queue.finish();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
