//! Weekly anomaly detection
//!
//! Scores each week of the aggregate series with an isolation forest over
//! `[revenue, transactions]` and flags the top `floor(contamination × n)`
//! scorers. Raising contamination never unflags a week; at the lowest
//! settings a small dataset flags nothing at all.

mod forest;

pub use forest::IsolationForest;

use std::collections::HashSet;

use tracing::debug;

use crate::config::DetectorSettings;
use crate::constants::detector;
use crate::types::{AnomalyFlag, LensError, Result, WeeklyAggregate};

/// Score every week and flag the most isolated ones.
///
/// Returns one flag per input week, in the same order. Fails with
/// `InsufficientData` when the series is shorter than two weeks.
pub fn detect(weekly: &[WeeklyAggregate], settings: &DetectorSettings) -> Result<Vec<AnomalyFlag>> {
    if weekly.len() < detector::MIN_WEEKS {
        return Err(LensError::InsufficientData {
            actual: weekly.len(),
            required: detector::MIN_WEEKS,
        });
    }

    let data: Vec<Vec<f64>> = weekly
        .iter()
        .map(|w| vec![w.revenue, w.transactions as f64])
        .collect();

    let forest = IsolationForest::fit(&data, settings.trees, settings.max_samples, settings.seed);
    let scores: Vec<f64> = data.iter().map(|point| forest.score(point)).collect();

    let quota = (settings.contamination * weekly.len() as f64).floor() as usize;
    debug!(
        "Scored {} weeks, flag quota {} at contamination {}",
        weekly.len(),
        quota,
        settings.contamination
    );

    // Highest scores first; ties resolve toward the earlier week
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    let flagged: HashSet<usize> = order.into_iter().take(quota).collect();

    Ok(weekly
        .iter()
        .enumerate()
        .map(|(i, week)| AnomalyFlag {
            week_start: week.week_start,
            score: scores[i],
            is_anomaly: flagged.contains(&i),
        })
        .collect())
}
