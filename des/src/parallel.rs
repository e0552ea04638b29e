//! Parallel execution of independent EventLoop scenarios
//!
//! Each scenario is built, run and summarised on a single worker thread, so an
//! `EventLoop` never crosses threads. Only the builder closure and the collected
//! stats need to be thread-safe.
//!
//! # Determinism
//!
//! Results are deterministic when the builder derives every seed from
//! `scenario_id` and agents own their RNGs. Results are returned in
//! `scenario_id` order whatever the thread count.
//!
//! # Error Handling
//!
//! A panic inside one scenario is caught and returned as `Err(String)`; the
//! other scenarios keep running.

use crate::EventLoop;
use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Executes multiple EventLoop scenarios in parallel
///
/// ```rust
/// use des::parallel::ParallelRunner;
/// # use des::{Agent, EventLoop};
/// # struct TestAgent;
/// # impl Agent<u8, u8> for TestAgent {
/// #     fn stats(&self) -> u8 { 7 }
/// # }
///
/// let results = ParallelRunner::new(8, |_scenario_id| {
///     let agents: Vec<Box<dyn Agent<u8, u8>>> = vec![Box::new(TestAgent)];
///     EventLoop::new(vec![(0, 1)], agents)
/// })
/// .num_threads(2)
/// .run(100);
///
/// assert_eq!(results.len(), 8);
/// assert!(results.iter().all(|r| r.as_ref().map(|s| s == &vec![7]).unwrap_or(false)));
/// ```
pub struct ParallelRunner<T, S, F>
where
    F: Fn(usize) -> EventLoop<T, S> + Send + Sync,
    S: Send,
{
    num_scenarios: usize,
    builder: F,
    num_threads: Option<usize>,
    progress_callback: Option<ProgressCallback>,
    _scenario: PhantomData<fn() -> (T, S)>,
}

impl<T, S, F> ParallelRunner<T, S, F>
where
    F: Fn(usize) -> EventLoop<T, S> + Send + Sync,
    S: Send,
{
    pub fn new(num_scenarios: usize, builder: F) -> Self {
        ParallelRunner {
            num_scenarios,
            builder,
            num_threads: None,
            progress_callback: None,
            _scenario: PhantomData,
        }
    }

    /// Use a dedicated pool of `n` threads instead of rayon's global pool
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Called with `(completed, total)` after each scenario finishes
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Run every scenario up to `run_until` and collect the stats of all agents,
    /// in scenario order.
    pub fn run(self, run_until: usize) -> Vec<Result<Vec<S>, String>> {
        let completed = AtomicUsize::new(0);

        let execute = || {
            (0..self.num_scenarios)
                .into_par_iter()
                .map(|scenario_id| {
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        let mut event_loop = (self.builder)(scenario_id);
                        event_loop.run(run_until);
                        event_loop.stats()
                    }));

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = &self.progress_callback {
                        callback(done, self.num_scenarios);
                    }

                    result.map_err(|panic| {
                        if let Some(s) = panic.downcast_ref::<&str>() {
                            s.to_string()
                        } else if let Some(s) = panic.downcast_ref::<String>() {
                            s.clone()
                        } else {
                            "Unknown panic".to_string()
                        }
                    })
                })
                .collect::<Vec<_>>()
        };

        // Fall back to the global pool if a dedicated one cannot be built
        let pool = self
            .num_threads
            .and_then(|n| rayon::ThreadPoolBuilder::new().num_threads(n).build().ok());

        match pool {
            Some(pool) => pool.install(execute),
            None => execute(),
        }
    }
}
