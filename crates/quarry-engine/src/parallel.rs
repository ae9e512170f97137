use std::ops::Range;

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::ThreadPool;

/// Split `0..len` into at most `workers` contiguous blocks of `ceil(len / workers)` rows.
///
/// Blocks are returned in index order; the last one may be shorter. An empty range yields no
/// blocks.
pub fn block_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let chunk = len.div_ceil(workers.max(1));
    (0..len)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(len))
        .collect()
}

/// Fork-join executor owned by one engine.
///
/// With one thread (or without the `parallel` feature) every call runs inline on the caller.
/// Otherwise work runs on a dedicated Rayon pool, so engines with different thread counts can
/// coexist in one process. Results are always returned in input order.
pub struct Executor {
    threads: usize,
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    pool: Option<ThreadPool>,
}

impl Executor {
    pub fn serial() -> Self {
        Self {
            threads: 1,
            #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
            pool: None,
        }
    }

    /// Build an executor with `threads` workers.
    ///
    /// If the pool cannot be created the executor degrades to serial execution.
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    pub fn new(threads: usize) -> Self {
        if threads <= 1 {
            return Self::serial();
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("quarry-worker-{i}"))
            .build()
        {
            Ok(pool) => Self {
                threads,
                pool: Some(pool),
            },
            Err(err) => {
                log::warn!("failed to build a {threads}-thread pool, running serially: {err}");
                Self::serial()
            }
        }
    }

    #[cfg(not(all(feature = "parallel", not(target_arch = "wasm32"))))]
    pub fn new(threads: usize) -> Self {
        if threads > 1 {
            log::debug!("parallel execution unavailable, ignoring {threads} threads");
        }
        Self::serial()
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn is_parallel(&self) -> bool {
        self.threads > 1
    }

    /// Run `f` over contiguous blocks of `0..len` and return the per-block results in block
    /// order.
    pub fn map_blocks<T, F>(&self, len: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Range<usize>) -> T + Sync + Send,
    {
        let blocks = block_ranges(len, self.threads);

        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            if let Some(pool) = &self.pool {
                return pool.install(|| blocks.into_par_iter().map(&f).collect());
            }
        }

        blocks.into_iter().map(f).collect()
    }

    /// Run `f` on every item and return the results in item order.
    pub fn map_items<I, T, F>(&self, items: &[I], f: F) -> Vec<T>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> T + Sync + Send,
    {
        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            if let Some(pool) = &self.pool {
                return pool.install(|| items.par_iter().map(&f).collect());
            }
        }

        items.iter().map(f).collect()
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("threads", &self.threads)
            .finish()
    }
}
