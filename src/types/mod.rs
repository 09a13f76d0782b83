pub mod error;
pub mod record;
pub mod summary;

pub use error::{ErrorCategory, ErrorClassifier, LensError, Result, parse_retry_after};
pub use record::{DropReason, DropStats, LoadOutcome, Record};
pub use summary::{
    AnalysisSummary, AnomalyFlag, InsightReport, KpiSet, RankKey, RankingEntry, TokenUsage,
    WeeklyAggregate,
};
