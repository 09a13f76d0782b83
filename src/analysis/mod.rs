//! Analysis pipeline
//!
//! Turns cleaned records into an [`AnalysisSummary`]: weekly aggregates,
//! headline KPIs, anomaly flags and top-revenue rankings. Stages run in a
//! fixed order and any stage failure aborts the run; partial summaries
//! are never produced.

pub mod aggregate;
pub mod rank;

pub use aggregate::{aggregate_weekly, compute_kpis, week_start};
pub use rank::top_by_revenue;

use tracing::{debug, info};

use crate::config::Config;
use crate::constants::trend;
use crate::detector;
use crate::types::{AnalysisSummary, RankKey, Record, Result};

/// Run the full analysis over cleaned records
pub fn run_analysis(records: &[Record], config: &Config) -> Result<AnalysisSummary> {
    let kpis = compute_kpis(records)?;
    let weekly = aggregate_weekly(records)?;
    debug!(
        "Aggregated {} records into {} weeks",
        records.len(),
        weekly.len()
    );

    let flags = detector::detect(&weekly, &config.detector)?;
    let anomalies = flags.iter().filter(|f| f.is_anomaly).count();
    info!("Flagged {} of {} weeks as anomalous", anomalies, weekly.len());

    let top_countries = top_by_revenue(records, RankKey::Country, config.ranking.top_n);
    let top_products = top_by_revenue(records, RankKey::Product, config.ranking.top_n);

    let recent_trend = weekly[weekly.len().saturating_sub(trend::RECENT_WEEKS)..].to_vec();

    Ok(AnalysisSummary {
        kpis,
        weekly,
        flags,
        top_countries,
        top_products,
        recent_trend,
    })
}
