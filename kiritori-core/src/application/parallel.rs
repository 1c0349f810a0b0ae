//! Chunk materialization, optionally on a rayon thread pool
//!
//! Boundary discovery is inherently sequential, but turning resolved spans
//! into chunks is a pure function of the span and runs in parallel once the
//! chunk count reaches the configured threshold. Results always come back
//! in input order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::{Arc, OnceLock};

/// Maps spans to chunks sequentially or on a dedicated thread pool
#[derive(Debug)]
pub struct ChunkMaterializer {
    /// Minimum item count to justify the thread pool
    threshold: usize,

    #[cfg(feature = "parallel")]
    threads: usize,

    /// Built on first parallel use; `None` if the pool could not be created
    #[cfg(feature = "parallel")]
    pool: OnceLock<Option<Arc<rayon::ThreadPool>>>,
}

impl ChunkMaterializer {
    /// Creates a materializer; `threads = None` uses one worker per CPU
    #[cfg_attr(not(feature = "parallel"), allow(unused_variables))]
    pub fn new(threads: Option<usize>, threshold: usize) -> Self {
        Self {
            threshold,
            #[cfg(feature = "parallel")]
            threads: threads.unwrap_or_else(num_cpus::get).max(1),
            #[cfg(feature = "parallel")]
            pool: OnceLock::new(),
        }
    }

    /// A materializer that never uses threads
    pub fn sequential() -> Self {
        Self::new(Some(1), usize::MAX)
    }

    /// Returns true if `count` items would be processed in parallel
    pub fn is_parallel(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && count >= self.threshold && count > 1
    }

    /// Applies `f` to every item, preserving order
    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            if let Some(pool) = self.is_parallel(items.len()).then(|| self.pool()).flatten() {
                log::debug!(
                    "materializing {} chunks on {} threads",
                    items.len(),
                    pool.current_num_threads()
                );
                return pool.install(|| items.into_par_iter().map(&f).collect());
            }
        }

        items.into_iter().map(f).collect()
    }

    #[cfg(feature = "parallel")]
    fn pool(&self) -> Option<&Arc<rayon::ThreadPool>> {
        self.pool
            .get_or_init(|| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.threads)
                    .thread_name(|i| format!("kiritori-worker-{i}"))
                    .build()
                    .map(Arc::new)
                    .map_err(|e| log::warn!("falling back to sequential materialization: {e}"))
                    .ok()
            })
            .as_ref()
    }
}

impl Default for ChunkMaterializer {
    fn default() -> Self {
        Self::new(None, crate::application::config::defaults::PARALLEL_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_preserves_order() {
        let materializer = ChunkMaterializer::sequential();
        assert!(!materializer.is_parallel(1000));
        let out = materializer.map((0..10).collect(), |i: usize| i * 2);
        assert_eq!(out, (0..10).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_preserves_order() {
        let materializer = ChunkMaterializer::new(Some(4), 8);
        let items: Vec<usize> = (0..500).collect();
        let out = materializer.map(items.clone(), |i| format!("chunk-{i}"));
        let expected: Vec<String> = items.iter().map(|i| format!("chunk-{i}")).collect();
        assert_eq!(out, expected);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_threshold() {
        let materializer = ChunkMaterializer::new(Some(2), 64);
        assert!(!materializer.is_parallel(63));
        assert!(materializer.is_parallel(64));
    }
}
