//! Assemble a `RevenueReport` from a product snapshot.

use crate::analysis::{
    build_filtered_ranked_rows, chart_bars, compute_top_categories, compute_total_revenue,
    date_range, distinct_categories,
};
use crate::config::ReportConfig;
use crate::models::{ProductRecord, ReportMetadata, RevenueReport};
use crate::report::generator::format_currency;
use chrono::Utc;
use tracing::debug;

/// Knobs for a single report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Where the snapshot came from, shown in the metadata.
    pub source: String,
    /// Category filter for the table; `None` or empty shows everything.
    pub category: Option<String>,
    /// Number of categories in the chart.
    pub top_categories: usize,
    /// Currency symbol for formatted amounts.
    pub currency_symbol: String,
}

impl ReportOptions {
    pub fn from_config(config: &ReportConfig, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            category: None,
            top_categories: config.top_categories,
            currency_symbol: config.currency_symbol.clone(),
        }
    }
}

/// Run every aggregation over `records` and collect the results.
///
/// The chart and totals always cover the full snapshot; only the table
/// honours the category filter.
pub fn build_report(records: &[ProductRecord], options: &ReportOptions) -> RevenueReport {
    let filter = options.category.as_deref().unwrap_or("");

    let total_revenue = compute_total_revenue(records);
    let top_categories = compute_top_categories(records, options.top_categories);
    let chart = chart_bars(&top_categories);
    let rows = build_filtered_ranked_rows(records, filter);
    let categories = distinct_categories(records);
    let dates = date_range(records);

    debug!(
        "Report over {} products: revenue {:.2}, {} categories, {} rows",
        records.len(),
        total_revenue,
        categories.len(),
        rows.len()
    );

    RevenueReport {
        metadata: ReportMetadata {
            source: options.source.clone(),
            generated_at: Utc::now(),
            record_count: records.len(),
            category_filter: Some(filter.to_string()).filter(|f| !f.is_empty()),
            earliest_date: dates.map(|(lo, _)| lo),
            latest_date: dates.map(|(_, hi)| hi),
        },
        total_revenue,
        total_revenue_display: format_currency(total_revenue, &options.currency_symbol),
        top_categories,
        chart,
        rows,
        categories,
    }
}
