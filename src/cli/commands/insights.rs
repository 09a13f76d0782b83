//! Insights Command
//!
//! Runs the full analysis and asks a text-generation provider for a
//! narrative summary. Provider failures are scoped to the insight panel:
//! the dashboard still renders and the command exits cleanly with the
//! failure shown where the narrative would have been.

use std::path::Path;

use crate::analysis;
use crate::cli::commands::analyze::{self, AnalyzeOptions};
use crate::cli::render::{self, Output};
use crate::config::Config;
use crate::insight::{InsightComposer, create_provider};
use crate::loader;
use crate::types::{AnalysisSummary, InsightReport, Result};

#[derive(Debug, Clone, Default)]
pub struct InsightOptions {
    pub analyze: AnalyzeOptions,
    pub provider: Option<String>,
    pub model: Option<String>,
}

pub async fn run(file: &Path, options: &InsightOptions, format: &str) -> Result<()> {
    let config = load_config(options)?;
    let out = Output::new();

    let outcome = loader::load_file(file, &config)?;
    let summary = analysis::run_analysis(&outcome.records, &config)?;
    let narrative = generate_narrative(&summary, &config).await;

    if format == "json" {
        let value = match narrative {
            Ok(report) => serde_json::json!({
                "summary": summary,
                "insight": report,
            }),
            Err(err) if err.is_insight_scoped() => serde_json::json!({
                "summary": summary,
                "insight": null,
                "insight_error": err.to_string(),
            }),
            Err(err) => return Err(err),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    render::render_dashboard(&out, &summary, &outcome.dropped);

    match narrative {
        Ok(report) => render::render_insight(&out, &report),
        Err(err) if err.is_insight_scoped() => {
            out.section("Insight");
            out.info(&format!("Narrative unavailable: {err}"));
        }
        Err(err) => return Err(err),
    }

    Ok(())
}

fn load_config(options: &InsightOptions) -> Result<Config> {
    let mut config = analyze::load_config(&options.analyze)?;

    if let Some(provider) = &options.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &options.model {
        config.llm.model = model.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn generate_narrative(summary: &AnalysisSummary, config: &Config) -> Result<InsightReport> {
    let provider = create_provider(&config.llm)?;
    let composer = InsightComposer::new(provider, &config.llm);
    composer.compose(summary).await
}
