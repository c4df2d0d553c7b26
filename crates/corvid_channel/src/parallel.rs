//! `parallel_for` and `parallel_reduce`, both built on top of
//! [`crate::ThreadPool`]: divide `[start, end)` into `⌈N/threads⌉`
//! contiguous chunks, one task per chunk.

use std::sync::{Arc, Mutex};

use crate::pool::ThreadPool;

fn chunk_size(total: usize, threads: usize) -> usize {
    (total + threads - 1) / threads
}

/// Run `f(i)` for every `i` in `[start, end)`, split into one task per
/// chunk across `pool`'s workers, and block until all chunks finish.
pub fn parallel_for<F>(pool: &ThreadPool, start: usize, end: usize, f: F)
where
    F: Fn(usize) + Send + Sync + 'static,
{
    if end <= start {
        return;
    }
    let threads = pool.worker_count().max(1);
    let chunk = chunk_size(end - start, threads);
    let f = Arc::new(f);
    for chunk_start in (start..end).step_by(chunk) {
        let chunk_end = (chunk_start + chunk).min(end);
        let f = f.clone();
        pool.submit(move || {
            for i in chunk_start..chunk_end {
                f(i);
            }
        });
    }
    pool.wait_all();
}

/// Map `[start, end)` through `mapper`, reducing each chunk locally with
/// `reducer` starting from `identity`, then sequentially combining the
/// per-chunk accumulators (in index order) with the same `reducer` and
/// `identity`. `reducer` must be associative with `identity` as its
/// identity element for the result to be well defined.
pub fn parallel_reduce<T, M, R>(
    pool: &ThreadPool,
    start: usize,
    end: usize,
    identity: T,
    mapper: M,
    reducer: R,
) -> T
where
    T: Clone + Send + 'static,
    M: Fn(usize) -> T + Send + Sync + 'static,
    R: Fn(T, T) -> T + Send + Sync + 'static,
{
    if end <= start {
        return identity;
    }
    let threads = pool.worker_count().max(1);
    let chunk = chunk_size(end - start, threads);
    let mapper = Arc::new(mapper);
    let reducer = Arc::new(reducer);
    let partials: Arc<Mutex<Vec<(usize, T)>>> = Arc::new(Mutex::new(Vec::new()));

    for (chunk_index, chunk_start) in (start..end).step_by(chunk).enumerate() {
        let chunk_end = (chunk_start + chunk).min(end);
        let mapper = mapper.clone();
        let reducer = reducer.clone();
        let partials = partials.clone();
        let local_identity = identity.clone();
        pool.submit(move || {
            let mut acc = local_identity;
            for i in chunk_start..chunk_end {
                acc = reducer(acc, mapper(i));
            }
            partials.lock().unwrap().push((chunk_index, acc));
        });
    }
    pool.wait_all();

    let mut collected = Arc::try_unwrap(partials).unwrap().into_inner().unwrap();
    collected.sort_by_key(|(idx, _)| *idx);
    collected.into_iter().fold(identity, |acc, (_, local)| reducer(acc, local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn parallel_for_visits_every_index_exactly_once() {
        let pool = ThreadPool::new(4);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        parallel_for(&pool, 0, 100, move |i| {
            s.lock().unwrap().push(i);
        });
        let mut seen = Arc::try_unwrap(seen).unwrap().into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        pool.shutdown();
    }

    #[test]
    fn parallel_reduce_sums_a_range() {
        let pool = ThreadPool::new(4);
        let total = parallel_reduce(&pool, 1, 101, 0i64, |i| i as i64, |a, b| a + b);
        assert_eq!(total, (1..=100i64).sum());
        pool.shutdown();
    }

    #[test]
    fn parallel_reduce_over_empty_range_returns_identity() {
        let pool = ThreadPool::new(2);
        let total = parallel_reduce(&pool, 5, 5, 7i64, |i| i as i64, |a, b| a + b);
        assert_eq!(total, 7);
        pool.shutdown();
    }

    #[test]
    fn parallel_for_empty_range_is_a_no_op() {
        let pool = ThreadPool::new(2);
        let counter = Arc::new(AtomicI64::new(0));
        let c = counter.clone();
        parallel_for(&pool, 10, 10, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        pool.shutdown();
    }
}
