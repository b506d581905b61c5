//! Fixed-size worker pool for stateless, independent units of work.
//!
//! Submitting a batch blocks the caller until every unit has completed.
//! Results come back in submission order regardless of completion order.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Error, Result};

pub struct TaskPool {
    pool: ThreadPool,
    workers: usize,
}

impl TaskPool {
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("termsage-worker-{}", i))
            .build()
            .map_err(|e| Error::Internal(format!("worker pool: {}", e)))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `f` to every item, preserving order.
    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        self.pool.install(|| items.into_par_iter().map(f).collect())
    }

    /// Like [`map`](Self::map), but each worker job first builds private
    /// state with `init` (e.g. its own store connection) and reuses it for
    /// the units it processes.
    pub fn map_with_init<T, S, R, I, F>(&self, items: Vec<T>, init: I, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        I: Fn() -> S + Sync + Send,
        F: Fn(&mut S, T) -> R + Sync + Send,
    {
        self.pool
            .install(|| items.into_par_iter().map_init(init, f).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_results_in_submission_order() {
        let pool = TaskPool::new(4).unwrap();
        let items: Vec<u64> = (0..64).collect();
        let out = pool.map(items, |i| {
            // Earlier items finish last
            std::thread::sleep(Duration::from_micros((64 - i) * 20));
            i * 2
        });
        assert_eq!(out, (0..64).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_map_with_init_state_per_job() {
        let pool = TaskPool::new(3).unwrap();
        let inits = AtomicUsize::new(0);
        let out = pool.map_with_init(
            (0..20).collect::<Vec<usize>>(),
            || {
                inits.fetch_add(1, Ordering::SeqCst);
                10usize
            },
            |base, i| *base + i,
        );
        assert_eq!(out, (10..30).collect::<Vec<_>>());
        assert!(inits.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_zero_workers_clamped() {
        let pool = TaskPool::new(0).unwrap();
        assert_eq!(pool.workers(), 1);
        assert!(pool.map(Vec::<u8>::new(), |x| x).is_empty());
    }
}
