//! Markdown and JSON report rendering.
//!
//! This module turns a `RevenueReport` into the text that is written to
//! disk or printed.

use crate::models::{ChartBar, ReportMetadata, RevenueReport, TableRow};
use anyhow::Result;

const BAR_CHAR: char = '█';

/// Format an amount with two decimals behind `symbol`.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    format!("{}{:.2}", symbol, amount)
}

/// Escape text placed inside a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    report: &RevenueReport,
    currency_symbol: &str,
    bar_width: usize,
    include_categories: bool,
) -> String {
    let mut output = String::new();

    output.push_str("# Inventory Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_revenue_section(report));
    output.push_str(&generate_chart_section(&report.chart, currency_symbol, bar_width));
    output.push_str(&generate_table_section(report, currency_symbol));

    if include_categories {
        output.push_str(&generate_categories_section(&report.categories));
    }

    output.push_str("---\n\n*Report generated by stocktally*\n");

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Products:** {}\n", metadata.record_count));
    if let (Some(lo), Some(hi)) = (metadata.earliest_date, metadata.latest_date) {
        section.push_str(&format!("- **Dates:** {} to {}\n", lo, hi));
    }
    if let Some(ref filter) = metadata.category_filter {
        section.push_str(&format!("- **Category Filter:** {}\n", filter));
    }
    section.push('\n');

    section
}

fn generate_revenue_section(report: &RevenueReport) -> String {
    format!(
        "## Total Revenue\n\n**{}**\n\n",
        report.total_revenue_display
    )
}

/// Width of each bar, proportional to the largest total.
fn bar_lengths(bars: &[ChartBar], width: usize) -> Vec<usize> {
    let max = bars.iter().map(|b| b.total).fold(0.0_f64, f64::max);
    bars.iter()
        .map(|bar| {
            if max <= 0.0 || bar.total <= 0.0 {
                0
            } else {
                ((bar.total / max) * width as f64).round().max(1.0) as usize
            }
        })
        .collect()
}

/// Generate the top-categories bar chart.
///
/// With no data the section carries a note instead of an empty chart.
fn generate_chart_section(bars: &[ChartBar], currency_symbol: &str, width: usize) -> String {
    let mut section = String::new();

    section.push_str("## Revenue by Category\n\n");

    if bars.is_empty() {
        section.push_str("No revenue to chart.\n\n");
        return section;
    }

    section.push_str("| Category | Revenue | |\n");
    section.push_str("|:---|---:|:---|\n");

    for (bar, len) in bars.iter().zip(bar_lengths(bars, width)) {
        let drawn: String = std::iter::repeat(BAR_CHAR).take(len).collect();
        section.push_str(&format!(
            "| {} | {} | `{}` |\n",
            cell(&bar.label),
            format_currency(bar.total, currency_symbol),
            drawn
        ));
    }
    section.push('\n');

    section
}

/// Generate the revenue-ranked product table.
fn generate_table_section(report: &RevenueReport, currency_symbol: &str) -> String {
    let mut section = String::new();

    section.push_str("## Products by Revenue\n\n");
    section.push_str("| ID | Name | Quantity | Unit Price | Total |\n");
    section.push_str("|:---|:---|---:|---:|---:|\n");

    for row in &report.rows {
        match row {
            TableRow::Product(p) => section.push_str(&format!(
                "| {} | {} | {} | {} | **{}** |\n",
                p.id_label(),
                cell(p.name_label()),
                p.quantity,
                format_currency(p.unit_price, currency_symbol),
                format_currency(p.line_revenue, currency_symbol)
            )),
            TableRow::Placeholder { message } => {
                section.push_str(&format!("| {} | | | | |\n", cell(message)))
            }
        }
    }
    section.push('\n');

    section
}

fn generate_categories_section(categories: &[String]) -> String {
    if categories.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Categories\n\n");
    for category in categories {
        section.push_str(&format!("- {}\n", category));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RevenueReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
