//! Terminal dashboard rendering
//!
//! Panel layout mirrors the web dashboard: KPI block, weekly revenue bars
//! with anomaly markers, flagged weeks, and the two ranking tables.

use console::style;

use crate::types::{AnalysisSummary, DropStats, InsightReport, RankingEntry};

const BAR_WIDTH: usize = 40;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// Render every panel of the dashboard for a completed analysis
pub fn render_dashboard(out: &Output, summary: &AnalysisSummary, dropped: &DropStats) {
    out.header("Revenue Lens");

    if !dropped.is_empty() {
        out.warning(&format!(
            "Dropped {} unusable rows ({})",
            dropped.total(),
            describe_drops(dropped)
        ));
    }

    let kpis = &summary.kpis;
    out.section("Key metrics");
    println!(
        "  Period:           {} to {}",
        kpis.date_range.0, kpis.date_range.1
    );
    println!("  Total revenue:    {:.2}", kpis.total_revenue);
    println!("  Transactions:     {}", kpis.transactions);
    println!("  Avg order value:  {:.2}", kpis.avg_order_value);
    if let Some(customers) = kpis.unique_customers {
        println!("  Unique customers: {customers}");
    }

    out.section("Weekly revenue");
    render_trend(summary);

    out.section("Anomalous weeks");
    let flagged = summary.anomalous_weeks();
    if flagged.is_empty() {
        out.info("No anomalous weeks at this sensitivity");
    } else {
        for flag in flagged {
            out.warning(&format!(
                "Week of {} scored {:.2}",
                flag.week_start, flag.score
            ));
        }
    }

    out.section("Top countries by revenue");
    render_ranking(out, &summary.top_countries);

    out.section("Top products by revenue");
    render_ranking(out, &summary.top_products);
}

/// Render the narrative panel for a generated insight
pub fn render_insight(out: &Output, report: &InsightReport) {
    out.section("Insight");
    println!("{}", report.narrative.trim_end());
    println!();
    println!(
        "{}",
        style(format!(
            "{} ({}), {} tokens, {:.1}s",
            report.provider,
            report.model,
            report.usage.total(),
            report.elapsed.as_secs_f64()
        ))
        .dim()
    );
}

fn render_trend(summary: &AnalysisSummary) {
    let max = summary
        .weekly
        .iter()
        .map(|w| w.revenue)
        .fold(0.0_f64, f64::max);

    for (week, flag) in summary.weekly.iter().zip(&summary.flags) {
        let bar = "█".repeat(bar_width(week.revenue, max));
        let line = format!("  {}  {:>12.2}  {}", week.week_start, week.revenue, bar);
        if flag.is_anomaly {
            println!("{} {}", style(line).red(), style("⚠").red().bold());
        } else {
            println!("{line}");
        }
    }
}

fn render_ranking(out: &Output, entries: &[RankingEntry]) {
    if entries.is_empty() {
        out.info("No data for this ranking");
        return;
    }
    for entry in entries {
        println!("  {:>2}. {:<36} {:>12.2}", entry.rank, entry.name, entry.revenue);
    }
}

fn describe_drops(dropped: &DropStats) -> String {
    dropped
        .breakdown()
        .iter()
        .map(|(reason, count)| format!("{count} {reason}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bar length scaled against the busiest week, never zero for real revenue
fn bar_width(revenue: f64, max: f64) -> usize {
    if revenue <= 0.0 || max <= 0.0 {
        return 0;
    }
    (((revenue / max) * BAR_WIDTH as f64).round() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width_scales_to_busiest_week() {
        assert_eq!(bar_width(100.0, 100.0), BAR_WIDTH);
        assert_eq!(bar_width(50.0, 100.0), BAR_WIDTH / 2);
    }

    #[test]
    fn test_bar_width_keeps_small_weeks_visible() {
        assert_eq!(bar_width(0.01, 10_000.0), 1);
    }

    #[test]
    fn test_bar_width_handles_degenerate_input() {
        assert_eq!(bar_width(0.0, 100.0), 0);
        assert_eq!(bar_width(100.0, 0.0), 0);
        assert_eq!(bar_width(-5.0, 100.0), 0);
    }
}
