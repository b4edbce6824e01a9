//! Bounded worker pool.

use rayon::prelude::*;

use crate::PipelineError;

/// Runs independent tasks either inline or on a dedicated rayon pool.
///
/// Results keep input order. The first task error is returned and the remaining
/// results are discarded.
#[derive(Debug)]
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Inline execution on the calling thread.
    #[must_use]
    pub const fn sequential() -> Self {
        Self { pool: None }
    }

    /// A pool of `max_workers` threads, or the available parallelism when `None`.
    ///
    /// # Errors
    /// Returns `WorkerPool` if the threads cannot be spawned.
    pub fn parallel(max_workers: Option<usize>) -> Result<Self, PipelineError> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("factorlab-worker-{i}"));
        if let Some(n) = max_workers {
            builder = builder.num_threads(n.max(1));
        }
        Ok(Self { pool: Some(builder.build()?) })
    }

    /// Pool matching the `parallel` and `max_workers` settings.
    ///
    /// # Errors
    /// Returns `WorkerPool` if the threads cannot be spawned.
    pub fn from_settings(parallel: bool, max_workers: Option<usize>) -> Result<Self, PipelineError> {
        if parallel { Self::parallel(max_workers) } else { Ok(Self::sequential()) }
    }

    /// Number of worker threads; `1` when inline.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.as_ref().map_or(1, rayon::ThreadPool::current_num_threads)
    }

    /// Apply `task` to every item, failing fast on the first error.
    ///
    /// # Errors
    /// Returns the first error produced by `task`.
    pub fn try_map<T, R, E, F>(&self, items: &[T], task: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().map(&task).collect()),
            None => items.iter().map(task).collect(),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::sequential()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(WorkerPool::sequential())]
    #[case(WorkerPool::parallel(Some(3)).unwrap())]
    fn preserves_order(#[case] pool: WorkerPool) {
        let items: Vec<usize> = (0..50).collect();
        let out: Vec<usize> = pool.try_map(&items, |x| Ok::<_, String>(x * 2)).unwrap();
        assert_eq!(out, items.iter().map(|x| x * 2).collect::<Vec<_>>());
    }

    #[rstest]
    #[case(WorkerPool::sequential())]
    #[case(WorkerPool::parallel(Some(2)).unwrap())]
    fn fails_fast(#[case] pool: WorkerPool) {
        let items: Vec<usize> = (0..10).collect();
        let result = pool.try_map(&items, |x| if *x == 4 { Err(format!("task {x}")) } else { Ok(*x) });
        assert_eq!(result.unwrap_err(), "task 4");
    }

    #[test]
    fn sequential_stops_at_first_error() {
        let calls = AtomicUsize::new(0);
        let items: Vec<usize> = (0..10).collect();
        let _ = WorkerPool::sequential().try_map(&items, |x| {
            calls.fetch_add(1, Ordering::SeqCst);
            if *x == 2 { Err(()) } else { Ok(()) }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn worker_count() {
        assert_eq!(WorkerPool::sequential().workers(), 1);
        assert_eq!(WorkerPool::parallel(Some(2)).unwrap().workers(), 2);
        assert_eq!(WorkerPool::parallel(Some(0)).unwrap().workers(), 1);
    }
}
