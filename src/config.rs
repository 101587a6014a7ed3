//! Configuration for encode/recover processing

/// Default amount of output bytes per call below which work stays on the calling thread
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Configuration for the codec engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Number of threads for computation (0 = auto-detect)
    pub threads: usize,
    /// Whether to spread output fragments across threads (false = single-threaded)
    pub parallel: bool,
    /// Minimum `size * outputs` of a call before it is processed in parallel
    pub parallel_threshold: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            threads: 0, // Auto-detect CPU cores
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl CodecConfig {
    pub fn new(threads: usize, parallel: bool) -> Self {
        Self {
            threads,
            parallel,
            ..Self::default()
        }
    }

    /// Single-threaded processing
    pub fn sequential() -> Self {
        Self::new(1, false)
    }

    pub fn with_parallel_threshold(mut self, bytes: usize) -> Self {
        self.parallel_threshold = bytes;
        self
    }

    pub fn from_args(matches: &clap::ArgMatches) -> Self {
        let threads = matches
            .get_one::<String>("threads")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let parallel = !matches.get_flag("no-parallel");

        Self::new(threads, parallel)
    }

    /// Get effective thread count (auto-detect if 0)
    pub fn effective_threads(&self) -> usize {
        match (self.parallel, self.threads) {
            (false, _) => 1, // Sequential mode always uses single thread
            (true, 0) => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4), // Auto-detect CPU cores
            (true, n) => n, // Use specified thread count
        }
    }

    /// Whether a call producing `outputs` fragments of `size` bytes should run in
    /// parallel on `threads` threads (the resolved [`effective_threads`](Self::effective_threads))
    pub fn use_parallel(&self, threads: usize, size: usize, outputs: usize) -> bool {
        self.parallel
            && outputs > 1
            && threads > 1
            && size.saturating_mul(outputs) >= self.parallel_threshold
    }
}
