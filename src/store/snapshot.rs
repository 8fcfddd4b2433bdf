//! JSON exports of a product list.
//!
//! An export is a JSON array of product objects using the same keys the
//! analytics page stores (`nombre`, `cantidad`, `precioUnitario`, ...).

use crate::models::{ProductRecord, RawProduct};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Read an export file into typed records.
pub async fn load_snapshot(path: &Path) -> Result<Vec<ProductRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    let rows: Vec<RawProduct> = serde_json::from_str(&content)
        .with_context(|| format!("Snapshot is not a JSON array of products: {}", path.display()))?;

    info!("Loaded {} products from {}", rows.len(), path.display());
    Ok(rows.into_iter().map(ProductRecord::from).collect())
}

/// Write records to an export file, replacing it atomically.
pub fn save_snapshot(path: &Path, records: &[ProductRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let json = serde_json::to_string_pretty(records).context("Failed to serialize products")?;

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    file.write_all(json.as_bytes())?;
    file.persist(path)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;

    debug!("Saved {} products to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("productos.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "nombre": "Silla", "categoria": "Muebles", "cantidad": 2, "precioUnitario": 10},
                {"id": 2, "nombre": "Lámpara", "cantidad": "", "precio_unitario": "7.5"}
            ]"#,
        )
        .unwrap();

        let records = tokio_test::block_on(load_snapshot(&path)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line_revenue(), 20.0);
        assert_eq!(records[1].quantity, 0);
        assert_eq!(records[1].unit_price, 7.5);
    }

    #[test]
    fn test_load_snapshot_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"nombre": "Silla"}"#).unwrap();

        assert!(tokio_test::block_on(load_snapshot(&path)).is_err());
    }

    #[test]
    fn test_load_missing_snapshot_fails() {
        let dir = TempDir::new().unwrap();
        let result = tokio_test::block_on(load_snapshot(&dir.path().join("missing.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_then_load_keeps_records() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.json");
        std::fs::write(
            &source,
            r#"[{"id": 3, "nombre": "Mesa", "cantidad": 1, "precioUnitario": 99.9, "fecha": "2024-06-01"}]"#,
        )
        .unwrap();
        let records = tokio_test::block_on(load_snapshot(&source)).unwrap();

        let target = dir.path().join("out.json");
        save_snapshot(&target, &records).unwrap();
        let reloaded = tokio_test::block_on(load_snapshot(&target)).unwrap();
        assert_eq!(reloaded, records);
    }
}
