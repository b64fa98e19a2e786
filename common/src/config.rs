use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 64;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1_000);

/// Presentation settings for the front end.
pub struct Config {
    pub no_banner: bool,
    /// 0 prints everything, 1 drops decoration, 2 prints the summary only.
    pub quiet: u8,
}

/// Knobs of the scan coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound on probes in flight at once. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Budget for a single connection attempt.
    pub probe_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl ScanConfig {
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
