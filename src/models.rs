//! Data models for inventory reporting.
//!
//! Records reach us with loosely typed fields: quantities and prices may be
//! numbers, numeric strings, empty strings or missing entirely. `RawProduct`
//! keeps that untyped shape and `ProductRecord::from` is the single place
//! where it becomes a well-typed record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Label used for records that have no category.
pub const UNCATEGORIZED: &str = "Sin categoría";

/// Placeholder shown when there are no records at all.
pub const NO_PRODUCTS_MESSAGE: &str = "No hay productos registrados.";

/// Placeholder shown when a category filter matches nothing.
pub const NO_PRODUCTS_IN_CATEGORY_MESSAGE: &str = "No hay productos en esta categoría.";

const ID_KEYS: &[&str] = &["id", "id_producto"];
const NAME_KEYS: &[&str] = &["nombre", "name"];
const CATEGORY_KEYS: &[&str] = &["categoria", "category"];
const SUPPLIER_KEYS: &[&str] = &["proveedor", "supplier"];
const QUANTITY_KEYS: &[&str] = &["cantidad", "quantity"];
const PRICE_KEYS: &[&str] = &["precioUnitario", "precio_unitario", "unit_price"];
const DATE_KEYS: &[&str] = &["fecha", "date"];
const DESCRIPTION_KEYS: &[&str] = &["descripcion", "description"];
const OWNER_KEYS: &[&str] = &["id_usuario", "owner"];

/// A product exactly as it came from the store or an export file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProduct(Map<String, Value>);

impl RawProduct {
    /// First non-null value among `keys`.
    fn field(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
    }

    /// First value among `keys` that a loose `a || b || 0` chain would pick.
    fn first_truthy(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| is_truthy(value))
    }

    fn text(&self, keys: &[&str]) -> String {
        match self.field(keys) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    fn optional_text(&self, keys: &[&str]) -> Option<String> {
        Some(self.text(keys)).filter(|s| !s.trim().is_empty())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Loosely coerce a JSON value to a finite number.
///
/// Numbers are taken as-is, strings are trimmed and parsed (an empty string
/// is zero). Everything else, and anything that does not parse to a finite
/// value, yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };

    parsed.filter(|f| f.is_finite())
}

fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Apply the zero-fallback policy: invalid, negative or missing becomes 0.
fn non_negative(value: Option<&Value>, field: &str, id: Option<i64>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };

    match coerce_number(value) {
        Some(n) if n > 0.0 => n,
        // also maps -0.0 to +0.0
        Some(n) if n == 0.0 => 0.0,
        _ => {
            debug!("Product {:?}: invalid {} {}, treated as 0", id, field, value);
            0.0
        }
    }
}

/// Whole units; values beyond the `u64` range are invalid and become 0.
fn quantity_units(value: Option<&Value>, id: Option<i64>) -> u64 {
    let n = non_negative(value, "quantity", id).trunc();
    if n >= u64::MAX as f64 {
        debug!("Product {:?}: quantity {} out of range, treated as 0", id, n);
        return 0;
    }
    n as u64
}

/// A well-typed product record.
///
/// Serializes with the export keys so a saved snapshot parses back through
/// `RawProduct`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    /// Product identifier, unique across the table.
    pub id: Option<i64>,
    /// Product name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Category label, `None` when the record has none.
    #[serde(rename = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Supplier name.
    #[serde(rename = "proveedor")]
    pub supplier: String,
    /// Units in stock.
    #[serde(rename = "cantidad")]
    pub quantity: u64,
    /// Price per unit.
    #[serde(rename = "precioUnitario")]
    pub unit_price: f64,
    /// Date as entered, usually `YYYY-MM-DD`.
    #[serde(rename = "fecha")]
    pub date: String,
    /// Free-form description.
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Opaque reference to the owning user.
    #[serde(rename = "id_usuario", skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl From<RawProduct> for ProductRecord {
    fn from(raw: RawProduct) -> Self {
        let id = raw.field(ID_KEYS).and_then(coerce_id);
        let quantity = quantity_units(raw.first_truthy(QUANTITY_KEYS), id);
        let unit_price = non_negative(raw.first_truthy(PRICE_KEYS), "unit price", id);

        Self {
            id,
            name: raw.text(NAME_KEYS),
            category: raw.optional_text(CATEGORY_KEYS),
            supplier: raw.text(SUPPLIER_KEYS),
            quantity,
            unit_price,
            date: raw.text(DATE_KEYS),
            description: raw.text(DESCRIPTION_KEYS),
            owner: raw.optional_text(OWNER_KEYS),
        }
    }
}

impl ProductRecord {
    /// The category label, with the sentinel substituted when missing.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    /// Quantity times unit price. Never stored.
    pub fn line_revenue(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// The record date as a calendar date, if it parses.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

/// One product projected for the revenue table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub id: Option<i64>,
    pub name: String,
    pub quantity: u64,
    pub unit_price: f64,
    pub line_revenue: f64,
}

impl DisplayRow {
    /// Identifier for display; missing or zero ids show as `N/A`.
    pub fn id_label(&self) -> String {
        match self.id {
            Some(id) if id != 0 => id.to_string(),
            _ => "N/A".to_string(),
        }
    }

    /// Name for display; empty names show as `N/A`.
    pub fn name_label(&self) -> &str {
        if self.name.is_empty() {
            "N/A"
        } else {
            &self.name
        }
    }
}

/// A row of the revenue table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TableRow {
    /// A real product.
    Product(DisplayRow),
    /// The single row shown instead of an empty table.
    Placeholder { message: String },
}

impl TableRow {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, TableRow::Placeholder { .. })
    }
}

/// Revenue summed over one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub label: String,
    pub total: f64,
}

/// A bar of the category chart with its fill and border colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    pub label: String,
    pub total: f64,
    pub background: String,
    pub border: String,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the records came from (file path or store user).
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of records in the snapshot.
    pub record_count: usize,
    /// Category filter applied to the table, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_filter: Option<String>,
    /// Earliest parseable record date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_date: Option<NaiveDate>,
    /// Latest parseable record date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_date: Option<NaiveDate>,
}

/// The complete analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueReport {
    pub metadata: ReportMetadata,
    /// Sum of line revenue over every record.
    pub total_revenue: f64,
    /// `total_revenue` formatted as currency.
    pub total_revenue_display: String,
    /// Highest-earning categories, descending.
    pub top_categories: Vec<CategoryTotal>,
    /// Chart dataset for `top_categories`; empty means "clear the chart".
    pub chart: Vec<ChartBar>,
    /// Revenue-ranked table rows (after the category filter).
    pub rows: Vec<TableRow>,
    /// Sorted category labels for the filter control.
    pub categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawProduct {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!("2.5")), Some(2.5));
        assert_eq!(coerce_number(&json!("  7 ")), Some(7.0));
        assert_eq!(coerce_number(&json!("")), Some(0.0));
        assert_eq!(coerce_number(&json!("x")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn test_record_from_export_keys() {
        let record = ProductRecord::from(raw(json!({
            "id": 4,
            "nombre": "Teclado",
            "categoria": "Periféricos",
            "proveedor": "Acme",
            "cantidad": "3",
            "precioUnitario": 12.5,
            "fecha": "2024-05-01",
            "descripcion": "Mecánico"
        })));

        assert_eq!(record.id, Some(4));
        assert_eq!(record.name, "Teclado");
        assert_eq!(record.category_label(), "Periféricos");
        assert_eq!(record.quantity, 3);
        assert_eq!(record.unit_price, 12.5);
        assert_eq!(record.line_revenue(), 37.5);
        assert_eq!(record.parsed_date(), NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_record_from_table_row_keys() {
        let record = ProductRecord::from(raw(json!({
            "id_producto": 9,
            "nombre": "Monitor",
            "cantidad": 2,
            "precio_unitario": "150",
            "id_usuario": 12
        })));

        assert_eq!(record.id, Some(9));
        assert_eq!(record.unit_price, 150.0);
        assert_eq!(record.owner.as_deref(), Some("12"));
        assert_eq!(record.category, None);
        assert_eq!(record.category_label(), UNCATEGORIZED);
    }

    #[test]
    fn test_invalid_numbers_become_zero() {
        let record = ProductRecord::from(raw(json!({
            "id": 3,
            "cantidad": "x",
            "precioUnitario": -5
        })));
        assert_eq!(record.quantity, 0);
        assert_eq!(record.unit_price, 0.0);
        assert_eq!(record.line_revenue(), 0.0);

        let missing = ProductRecord::from(raw(json!({ "id": 5 })));
        assert_eq!(missing.quantity, 0);
        assert_eq!(missing.unit_price, 0.0);
    }

    #[test]
    fn test_price_falls_back_to_snake_case_key() {
        let record = ProductRecord::from(raw(json!({
            "cantidad": 1,
            "precioUnitario": 0,
            "precio_unitario": 8
        })));
        assert_eq!(record.unit_price, 8.0);
    }

    #[test]
    fn test_negative_zero_price_is_positive_zero() {
        let record = ProductRecord::from(raw(json!({ "cantidad": 3, "precioUnitario": "-0" })));
        assert!(record.unit_price.is_sign_positive());
        assert!(record.line_revenue().is_sign_positive());

        let record = ProductRecord::from(raw(json!({ "cantidad": 3, "precioUnitario": -0.0 })));
        assert!(record.unit_price.is_sign_positive());
    }

    #[test]
    fn test_out_of_range_quantity_becomes_zero() {
        let record = ProductRecord::from(raw(json!({ "cantidad": "1e30", "precioUnitario": 2 })));
        assert_eq!(record.quantity, 0);
        assert_eq!(record.line_revenue(), 0.0);

        let record = ProductRecord::from(raw(json!({ "cantidad": 1e30, "precioUnitario": 2 })));
        assert_eq!(record.quantity, 0);
    }

    #[test]
    fn test_fractional_quantity_truncates() {
        let record = ProductRecord::from(raw(json!({ "cantidad": 2.9, "precioUnitario": 1 })));
        assert_eq!(record.quantity, 2);
    }

    #[test]
    fn test_empty_category_is_uncategorized() {
        let record = ProductRecord::from(raw(json!({ "categoria": "" })));
        assert_eq!(record.category, None);
        assert_eq!(record.category_label(), UNCATEGORIZED);
    }

    #[test]
    fn test_record_serializes_with_export_keys() {
        let record = ProductRecord::from(raw(json!({
            "id": 1,
            "nombre": "Silla",
            "categoria": "Muebles",
            "cantidad": 2,
            "precioUnitario": 10
        })));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["nombre"], "Silla");
        assert_eq!(value["precioUnitario"], 10.0);

        let reparsed = ProductRecord::from(raw(value));
        assert_eq!(reparsed, record);
    }

    #[test]
    fn test_display_row_labels() {
        let row = DisplayRow {
            id: Some(0),
            name: String::new(),
            quantity: 1,
            unit_price: 1.0,
            line_revenue: 1.0,
        };
        assert_eq!(row.id_label(), "N/A");
        assert_eq!(row.name_label(), "N/A");
    }
}
