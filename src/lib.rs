//! RevLens - Sales Analytics Dashboard
//!
//! Loads retail sales exports, aggregates revenue by week, scores weekly
//! outliers with an isolation forest, and optionally narrates the result
//! through a text-generation provider.
//!
//! ## Core Features
//!
//! - **Flexible Ingestion**: CSV and Excel exports with configurable columns
//! - **Weekly Aggregation**: Monday-anchored weeks with revenue KPIs
//! - **Anomaly Detection**: Seeded isolation forest over weekly features
//! - **Revenue Rankings**: Top countries and products by revenue
//! - **AI Insights**: Narrative summaries via Gemini or OpenAI, with retries
//!
//! ## Quick Start
//!
//! ```ignore
//! use revlens::analysis::run_analysis;
//! use revlens::config::ConfigLoader;
//! use revlens::loader;
//!
//! let config = ConfigLoader::load()?;
//! let outcome = loader::load_file("sales.csv".as_ref(), &config)?;
//! let summary = run_analysis(&outcome.records, &config)?;
//! ```
//!
//! ## Modules
//!
//! - [`loader`]: file ingestion and row cleaning
//! - [`analysis`]: weekly aggregation, KPIs, rankings
//! - [`detector`]: isolation-forest anomaly scoring
//! - [`insight`]: provider abstraction and narrative composition
//! - [`config`]: layered configuration

pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod detector;
pub mod insight;
pub mod loader;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, LensError, Result};

// Loading
pub use loader::load_file;
pub use types::{LoadOutcome, Record};

// =============================================================================
// Analysis Re-exports
// =============================================================================

pub use analysis::{compute_kpis, run_analysis, top_by_revenue, week_start};
pub use detector::{IsolationForest, detect};
pub use types::{AnalysisSummary, AnomalyFlag, KpiSet, RankKey, RankingEntry, WeeklyAggregate};

// =============================================================================
// Insight Re-exports
// =============================================================================

pub use insight::{
    Completion, GeminiProvider, InsightComposer, OpenAiProvider, SharedProvider, TextGenProvider,
    create_provider,
};
pub use types::{InsightReport, TokenUsage};
