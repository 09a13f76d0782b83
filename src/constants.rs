//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Anomaly detector constants
pub mod detector {
    /// Number of isolation trees in the forest
    pub const DEFAULT_TREES: usize = 200;

    /// Maximum subsample size per tree
    pub const DEFAULT_MAX_SAMPLES: usize = 256;

    /// Default contamination fraction (expected share of anomalous weeks)
    pub const DEFAULT_CONTAMINATION: f64 = 0.01;

    /// Default RNG seed for reproducible scoring
    pub const DEFAULT_SEED: u64 = 42;

    /// Minimum number of weeks required before outlier scoring is meaningful
    pub const MIN_WEEKS: usize = 2;

    /// Upper bound on the contamination fraction
    pub const MAX_CONTAMINATION: f64 = 0.5;
}

/// Trend and summary constants
pub mod trend {
    /// Number of trailing weeks included in the recent-trend section
    pub const RECENT_WEEKS: usize = 8;
}

/// Ranking constants
pub mod ranking {
    /// Default number of entries in a top-N ranking
    pub const DEFAULT_TOP_N: usize = 10;
}

/// HTTP/Network constants
pub mod network {
    /// Default text-generation request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;

    /// Default maximum retries for retryable provider failures
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Sample data generation constants
pub mod sample {
    /// Default number of transaction rows in a generated sample file
    pub const DEFAULT_ROWS: usize = 500;

    /// Default seed so the shipped sample is stable across runs
    pub const DEFAULT_SEED: u64 = 7;
}
