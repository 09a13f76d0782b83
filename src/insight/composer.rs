//! Insight composition
//!
//! Drives a text-generation provider to turn an analysis summary into a
//! prose report. Each attempt runs under a hard timeout; transient network
//! failures are retried with capped exponential backoff and jitter, while
//! auth, rate-limit, and API errors surface immediately.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::constants::network::{BACKOFF_FACTOR, BASE_DELAY_MS, MAX_DELAY_SECS};
use crate::types::{AnalysisSummary, InsightReport, LensError, Result};

use super::prompt::build_prompt;
use super::provider::{Completion, SharedProvider};

/// Turns analysis summaries into narrative reports via a provider
pub struct InsightComposer {
    provider: SharedProvider,
    timeout: Duration,
    max_retries: u32,
}

impl InsightComposer {
    pub fn new(provider: SharedProvider, config: &LlmConfig) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
        }
    }

    /// Generate the narrative for a completed analysis
    pub async fn compose(&self, summary: &AnalysisSummary) -> Result<InsightReport> {
        let prompt = build_prompt(summary);
        let started = Instant::now();

        let mut attempt: u32 = 0;
        let mut delay = Duration::from_millis(BASE_DELAY_MS);
        let max_delay = Duration::from_secs(MAX_DELAY_SECS);

        loop {
            attempt += 1;
            debug!(
                provider = %self.provider.name(),
                attempt,
                "requesting insight narrative"
            );

            match self.generate(&prompt).await {
                Ok(completion) => {
                    let report = InsightReport {
                        narrative: completion.text,
                        provider: self.provider.name().to_string(),
                        model: self.provider.model().to_string(),
                        usage: completion.usage,
                        elapsed: started.elapsed(),
                    };
                    info!(
                        provider = %report.provider,
                        attempts = attempt,
                        tokens = report.usage.total(),
                        "insight narrative generated"
                    );
                    return Ok(report);
                }
                Err(err) if err.is_retryable() && attempt <= self.max_retries => {
                    let pause = delay + random_jitter(delay);
                    warn!(
                        provider = %self.provider.name(),
                        attempt,
                        delay_ms = pause.as_millis() as u64,
                        error = %err,
                        "transient provider failure, retrying"
                    );
                    tokio::time::sleep(pause).await;
                    delay = next_backoff(delay, BACKOFF_FACTOR, max_delay);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<Completion> {
        match tokio::time::timeout(self.timeout, self.provider.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(LensError::timeout("insight generation", self.timeout)),
        }
    }
}

/// Random jitter up to a quarter of the base delay
fn random_jitter(base: Duration) -> Duration {
    let max_jitter_ms = (base.as_millis() / 4) as u64;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..max_jitter_ms))
}

/// Exponential backoff capped at `max`
fn next_backoff(current: Duration, factor: f32, max: Duration) -> Duration {
    Duration::from_secs_f32(current.as_secs_f32() * factor).min(max)
}
