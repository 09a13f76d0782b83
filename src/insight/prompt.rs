//! Insight prompt construction
//!
//! Renders an [`AnalysisSummary`] into the prompt sent to the
//! text-generation service. The template is fully deterministic: the same
//! summary always produces byte-identical text, so provider responses are
//! the only source of variation between runs. Only aggregate figures go
//! into the prompt; no row-level data and never any credential.

use std::fmt::Write;

use crate::types::AnalysisSummary;

/// Build the narrative prompt for a completed analysis
pub fn build_prompt(summary: &AnalysisSummary) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are a senior business analyst. Write a concise executive summary \
         of the following sales analysis for a non-technical audience.\n\n",
    );

    let kpis = &summary.kpis;
    let _ = writeln!(prompt, "Key metrics:");
    let _ = writeln!(
        prompt,
        "- Period: {} to {}",
        kpis.date_range.0, kpis.date_range.1
    );
    let _ = writeln!(prompt, "- Total revenue: {:.2}", kpis.total_revenue);
    let _ = writeln!(prompt, "- Transactions: {}", kpis.transactions);
    let _ = writeln!(prompt, "- Average order value: {:.2}", kpis.avg_order_value);
    if let Some(customers) = kpis.unique_customers {
        let _ = writeln!(prompt, "- Unique customers: {customers}");
    }

    let _ = writeln!(prompt, "\nRecent weekly revenue:");
    for week in &summary.recent_trend {
        let _ = writeln!(
            prompt,
            "- Week of {}: revenue {:.2} across {} transactions",
            week.week_start, week.revenue, week.transactions
        );
    }

    let anomalous = summary.anomalous_weeks();
    let _ = writeln!(prompt, "\nAnomalous weeks:");
    if anomalous.is_empty() {
        let _ = writeln!(prompt, "- None detected");
    } else {
        for flag in anomalous {
            let _ = writeln!(
                prompt,
                "- Week of {} (isolation score {:.2})",
                flag.week_start, flag.score
            );
        }
    }

    if !summary.top_countries.is_empty() {
        let _ = writeln!(prompt, "\nTop countries by revenue:");
        for entry in &summary.top_countries {
            let _ = writeln!(
                prompt,
                "{}. {}: {:.2}",
                entry.rank, entry.name, entry.revenue
            );
        }
    }

    if !summary.top_products.is_empty() {
        let _ = writeln!(prompt, "\nTop products by revenue:");
        for entry in &summary.top_products {
            let _ = writeln!(
                prompt,
                "{}. {}: {:.2}",
                entry.rank, entry.name, entry.revenue
            );
        }
    }

    prompt.push_str(
        "\nWrite three or four short paragraphs in markdown: overall performance, \
         the recent trend, anything unusual worth investigating, and one concrete \
         recommendation. Do not repeat the raw numbers as a list.",
    );

    prompt
}
