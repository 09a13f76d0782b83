//! Analysis output types
//!
//! Everything the pipeline produces downstream of cleaning: weekly
//! aggregates, headline KPIs, anomaly flags, revenue rankings, and the
//! assembled [`AnalysisSummary`] that feeds both the renderer and the
//! insight prompt.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// Weekly Aggregation
// =============================================================================

/// Revenue and volume for one calendar week (Monday start)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    /// Monday of the week this row covers
    pub week_start: NaiveDate,
    /// Sum of line revenue across the week's transactions
    pub revenue: f64,
    /// Number of transactions in the week
    pub transactions: u64,
    /// Revenue divided by transactions
    pub avg_order_value: f64,
    /// Distinct countries that purchased this week, when the column exists
    pub unique_countries: Option<u64>,
}

// =============================================================================
// Headline KPIs
// =============================================================================

/// Dataset-wide headline figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSet {
    pub total_revenue: f64,
    pub transactions: u64,
    pub avg_order_value: f64,
    /// Distinct customer IDs, absent when the input has no customer column
    pub unique_customers: Option<u64>,
    /// First and last transaction dates in the cleaned data
    pub date_range: (NaiveDate, NaiveDate),
}

// =============================================================================
// Anomaly Flags
// =============================================================================

/// Anomaly verdict for one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFlag {
    pub week_start: NaiveDate,
    /// Isolation score in (0, 1]; higher means more isolated
    pub score: f64,
    pub is_anomaly: bool,
}

// =============================================================================
// Rankings
// =============================================================================

/// What a ranking groups revenue by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankKey {
    Country,
    Product,
}

impl std::fmt::Display for RankKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Country => write!(f, "country"),
            Self::Product => write!(f, "product"),
        }
    }
}

/// One row of a top-N revenue ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// Country name or product description
    pub name: String,
    pub revenue: f64,
    /// 1-based position in the ranking
    pub rank: usize,
}

// =============================================================================
// Analysis Summary
// =============================================================================

/// Full output of one analysis run, ready for rendering or prompting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub kpis: KpiSet,
    /// All weeks in chronological order
    pub weekly: Vec<WeeklyAggregate>,
    /// One flag per week, aligned with `weekly`
    pub flags: Vec<AnomalyFlag>,
    /// Top countries by revenue, empty when the input has no country column
    pub top_countries: Vec<RankingEntry>,
    /// Top products by revenue, empty when the input has no description column
    pub top_products: Vec<RankingEntry>,
    /// Tail of `weekly` used for trend narration
    pub recent_trend: Vec<WeeklyAggregate>,
}

impl AnalysisSummary {
    /// Weeks flagged anomalous, in chronological order
    pub fn anomalous_weeks(&self) -> Vec<&AnomalyFlag> {
        self.flags.iter().filter(|f| f.is_anomaly).collect()
    }
}

// =============================================================================
// Insight Report
// =============================================================================

/// Token accounting reported by the text-generation service
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A generated narrative plus provenance for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    /// Markdown narrative returned by the service
    pub narrative: String,
    /// Provider that produced it, e.g. "gemini"
    pub provider: String,
    /// Model identifier, e.g. "gemini-2.0-flash"
    pub model: String,
    pub usage: TokenUsage,
    /// Wall-clock time of the call including retries
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

/// Serialize durations as fractional seconds for the JSON output
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs_f64().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs_f64(f64::deserialize(d)?))
    }
}
