//! Row shapes written to the hosted table.

use serde::Serialize;
use serde_json::Value;

/// Owner ids are numeric in the table; keep anything else as text.
pub fn owner_value(user: &str) -> Value {
    match user.trim().parse::<i64>() {
        Ok(id) => Value::from(id),
        Err(_) => Value::from(user),
    }
}

/// A complete product row, as inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub id_producto: i64,
    pub nombre: String,
    pub categoria: String,
    pub proveedor: String,
    pub cantidad: u64,
    pub precio_unitario: f64,
    pub fecha: String,
    pub descripcion: String,
    pub id_usuario: Value,
}

/// A partial update; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proveedor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cantidad: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio_unitario: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_owner_value() {
        assert_eq!(owner_value("12"), json!(12));
        assert_eq!(owner_value("a1b2"), json!("a1b2"));
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = ProductPatch {
            cantidad: Some(3),
            precio_unitario: Some(2.5),
            ..Default::default()
        };

        assert!(!patch.is_empty());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"cantidad": 3, "precio_unitario": 2.5})
        );
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_row_uses_table_keys() {
        let row = ProductRow {
            id_producto: 4,
            nombre: "Café".to_string(),
            categoria: "Bebidas".to_string(),
            proveedor: "Finca".to_string(),
            cantidad: 10,
            precio_unitario: 4.5,
            fecha: "2024-01-02".to_string(),
            descripcion: String::new(),
            id_usuario: owner_value("7"),
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["id_producto"], 4);
        assert_eq!(value["precio_unitario"], 4.5);
        assert_eq!(value["id_usuario"], 7);
    }
}
