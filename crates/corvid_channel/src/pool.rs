//! A fixed-size worker pool: workers consume from one shared task queue,
//! submission signals a condition variable, and `wait_all` blocks until
//! the active-task counter returns to zero.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// Hard cap on how many worker threads a single pool may run.
pub const MAX_WORKERS: usize = 64;

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    tasks: Mutex<VecDeque<Task>>,
    has_work: Condvar,
    shutdown: Mutex<bool>,
    active: Mutex<usize>,
    idle: Condvar,
}

/// A pool of worker threads sized once at construction and capped at
/// [`MAX_WORKERS`].
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(size: usize) -> Self {
        let size = size.clamp(1, MAX_WORKERS);
        let shared = Arc::new(Shared {
            tasks: Mutex::new(VecDeque::new()),
            has_work: Condvar::new(),
            shutdown: Mutex::new(false),
            active: Mutex::new(0),
            idle: Condvar::new(),
        });
        let workers = (0..size)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || worker_loop(shared))
            })
            .collect();
        ThreadPool { shared, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue `task` and wake one idle worker.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        *self.shared.active.lock().unwrap() += 1;
        self.shared.tasks.lock().unwrap().push_back(Box::new(task));
        self.shared.has_work.notify_one();
    }

    /// Block until every submitted task (including ones submitted while
    /// this call is waiting) has finished running.
    pub fn wait_all(&self) {
        let guard = self.shared.active.lock().unwrap();
        let _ = self.shared.idle.wait_while(guard, |active| *active != 0).unwrap();
    }

    /// Signal shutdown, let workers drain whatever is left in the queue,
    /// then join every thread.
    pub fn shutdown(mut self) {
        *self.shared.shutdown.lock().unwrap() = true;
        self.shared.has_work.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let mut tasks = shared.tasks.lock().unwrap();
        let task = loop {
            if let Some(task) = tasks.pop_front() {
                break Some(task);
            }
            if *shared.shutdown.lock().unwrap() {
                break None;
            }
            tasks = shared.has_work.wait(tasks).unwrap();
        };
        drop(tasks);

        match task {
            Some(task) => {
                task();
                let mut active = shared.active.lock().unwrap();
                *active -= 1;
                if *active == 0 {
                    shared.idle.notify_all();
                }
            }
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn pool_size_is_capped_at_max_workers() {
        let pool = ThreadPool::new(1000);
        assert_eq!(pool.worker_count(), MAX_WORKERS);
        pool.shutdown();
    }

    #[test]
    fn wait_all_blocks_until_every_task_completes() {
        let pool = ThreadPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let counter = counter.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_all();
        assert_eq!(counter.load(Ordering::SeqCst), 50);
        pool.shutdown();
    }

    #[test]
    fn shutdown_drains_queued_tasks_before_exiting() {
        let pool = ThreadPool::new(1);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = counter.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
