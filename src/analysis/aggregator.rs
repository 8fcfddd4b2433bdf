//! Revenue aggregation over a product snapshot.
//!
//! Every function here takes the snapshot by shared reference and returns a
//! freshly computed value. Nothing is cached between calls.

use crate::models::{
    CategoryTotal, ChartBar, DisplayRow, ProductRecord, TableRow, NO_PRODUCTS_IN_CATEGORY_MESSAGE,
    NO_PRODUCTS_MESSAGE,
};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Sum of quantity × unit price over all records.
pub fn compute_total_revenue(records: &[ProductRecord]) -> f64 {
    // fold from +0.0; an empty float sum is -0.0
    records.iter().fold(0.0, |acc, r| acc + r.line_revenue())
}

/// Revenue per category, highest first, truncated to `limit` groups.
///
/// Ties keep the order in which the categories were first seen.
pub fn compute_top_categories(records: &[ProductRecord], limit: usize) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let label = record.category_label();
        let slot = *index.entry(label).or_insert_with(|| {
            totals.push(CategoryTotal {
                label: label.to_string(),
                total: 0.0,
            });
            totals.len() - 1
        });
        totals[slot].total += record.line_revenue();
    }

    // sort_by is stable
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals.truncate(limit);
    totals
}

/// Records ranked by line revenue (highest first) as table rows.
///
/// An empty input yields a single placeholder row.
pub fn build_revenue_ranked_rows(records: &[ProductRecord]) -> Vec<TableRow> {
    ranked_rows_with_placeholder(records, NO_PRODUCTS_MESSAGE)
}

/// Same as [`build_revenue_ranked_rows`], with the placeholder text used
/// when a category filter matched nothing.
pub fn build_filtered_ranked_rows(records: &[ProductRecord], label: &str) -> Vec<TableRow> {
    let filtered = filter_by_category(records, label);
    if is_no_filter(label) {
        build_revenue_ranked_rows(&filtered)
    } else {
        ranked_rows_with_placeholder(&filtered, NO_PRODUCTS_IN_CATEGORY_MESSAGE)
    }
}

fn ranked_rows_with_placeholder(records: &[ProductRecord], placeholder: &str) -> Vec<TableRow> {
    if records.is_empty() {
        return vec![TableRow::Placeholder {
            message: placeholder.to_string(),
        }];
    }

    let mut rows: Vec<DisplayRow> = records
        .iter()
        .map(|r| DisplayRow {
            id: r.id,
            name: r.name.clone(),
            quantity: r.quantity,
            unit_price: r.unit_price,
            line_revenue: r.line_revenue(),
        })
        .collect();

    rows.sort_by(|a, b| b.line_revenue.total_cmp(&a.line_revenue));
    rows.into_iter().map(TableRow::Product).collect()
}

/// Sorted, de-duplicated category labels.
pub fn distinct_categories(records: &[ProductRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.category_label())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

fn is_no_filter(label: &str) -> bool {
    label.is_empty()
}

/// Records whose effective category equals `label`.
///
/// An empty label means no filter. The sentinel label selects the
/// uncategorized records.
pub fn filter_by_category(records: &[ProductRecord], label: &str) -> Vec<ProductRecord> {
    if is_no_filter(label) {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|r| r.category_label() == label)
        .cloned()
        .collect()
}

/// Colour the category totals for the bar chart.
pub fn chart_bars(top: &[CategoryTotal]) -> Vec<ChartBar> {
    top.iter()
        .enumerate()
        .map(|(i, category)| {
            let (r, g, b) = bar_rgb(i);
            ChartBar {
                label: category.label.clone(),
                total: category.total,
                background: format!("rgba({}, {}, {}, 0.8)", r, g, b),
                border: format!("rgba({}, {}, {}, 1)", r, g, b),
            }
        })
        .collect()
}

fn bar_rgb(index: usize) -> (i64, i64, i64) {
    let i = index as i64;
    (60 + i * 30, 140 - i * 10, 200 - i * 15)
}

/// Earliest and latest parseable record dates.
pub fn date_range(records: &[ProductRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = records.iter().filter_map(ProductRecord::parsed_date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}
