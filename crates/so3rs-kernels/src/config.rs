//! Execution configuration for kernel backends

/// Environment variable overriding [`KernelConfig::parallel_min_batch`]
pub const PARALLEL_MIN_BATCH_ENV: &str = "SO3RS_PARALLEL_MIN_BATCH";

const DEFAULT_PARALLEL_MIN_BATCH: usize = 2;

/// Knobs shared by every backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    /// Smallest batch for which host loops fan out across worker threads
    pub parallel_min_batch: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        let parallel_min_batch = std::env::var(PARALLEL_MIN_BATCH_ENV)
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_PARALLEL_MIN_BATCH);
        Self { parallel_min_batch }
    }
}

impl KernelConfig {
    /// Configuration from the environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parallel batch threshold
    pub fn with_parallel_min_batch(mut self, batch: usize) -> Self {
        self.parallel_min_batch = batch;
        self
    }

    /// Force sequential host loops
    pub fn sequential() -> Self {
        Self {
            parallel_min_batch: usize::MAX,
        }
    }

    /// Whether a batch of this size should run in parallel
    #[inline]
    pub fn parallel_for(&self, batch: usize) -> bool {
        cfg!(feature = "parallel") && batch >= self.parallel_min_batch
    }
}
