//! Client for the hosted product table.
//!
//! The table is served through PostgREST conventions: filters go in the
//! query string as `column=eq.value`, and writes ask for the affected rows
//! back with `Prefer: return=representation`.

use super::rows::{ProductPatch, ProductRow};
use super::StoreError;
use crate::config::StoreConfig;
use crate::models::{ProductRecord, RawProduct};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const RETURN_REPRESENTATION: &str = "return=representation";

type Query = Vec<(&'static str, String)>;

/// Products of one user.
fn list_query(user: &str) -> Query {
    vec![("select", "*".to_string()), ("id_usuario", format!("eq.{}", user))]
}

/// The single row with the highest product id, across all users.
fn max_id_query() -> Query {
    vec![
        ("select", "id_producto".to_string()),
        ("order", "id_producto.desc".to_string()),
        ("limit", "1".to_string()),
    ]
}

/// One product, only if it belongs to `user`.
fn owned_product_query(id: i64, user: &str) -> Query {
    vec![
        ("id_producto", format!("eq.{}", id)),
        ("id_usuario", format!("eq.{}", user)),
    ]
}

#[derive(Debug, Deserialize)]
struct MaxIdRow {
    id_producto: Option<i64>,
}

/// Typed access to one user's products in the hosted table.
pub struct InventoryStore {
    http_client: reqwest::Client,
    table_url: String,
    api_key: String,
    user: String,
}

impl InventoryStore {
    /// Build a client from the store settings.
    ///
    /// Fails when the URL, API key or user are missing.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base = config.url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(StoreError::MissingSetting("store.url"));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(StoreError::InvalidUrl(base.to_string()));
        }
        if config.api_key.trim().is_empty() {
            return Err(StoreError::MissingSetting("store.api_key"));
        }
        let user = config
            .user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(StoreError::MissingSetting("store.user"))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            table_url: format!("{}/rest/v1/{}", base, config.table),
            api_key: config.api_key.clone(),
            user: user.to_string(),
        })
    }

    /// The user this client reads and writes for.
    pub fn user(&self) -> &str {
        &self.user
    }

    fn request(&self, method: Method, query: &Query) -> RequestBuilder {
        self.http_client
            .request(method, &self.table_url)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Store request failed with {}: {}", status, body);
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(StoreError::Decode)
    }

    /// Fetch all products owned by the user.
    pub async fn fetch_products(&self) -> Result<Vec<ProductRecord>, StoreError> {
        debug!("Fetching products for user {}", self.user);
        let rows: Vec<RawProduct> = self
            .send(self.request(Method::GET, &list_query(&self.user)))
            .await?;

        info!("Loaded {} products for user {}", rows.len(), self.user);
        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    /// Next free product id: one past the highest id in the table, or 1.
    pub async fn next_product_id(&self) -> Result<i64, StoreError> {
        let rows: Vec<MaxIdRow> = self.send(self.request(Method::GET, &max_id_query())).await?;

        let next = match rows.first() {
            Some(row) => row.id_producto.unwrap_or(0) + 1,
            None => {
                debug!("Product table is empty, starting at id 1");
                1
            }
        };
        Ok(next)
    }

    /// Insert a product and return it as stored.
    pub async fn insert_product(&self, row: &ProductRow) -> Result<ProductRecord, StoreError> {
        info!("Inserting product {} ({})", row.id_producto, row.nombre);
        let request = self
            .request(Method::POST, &Vec::new())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[row]);

        let rows: Vec<RawProduct> = self.send(request).await?;
        rows.into_iter()
            .next()
            .map(ProductRecord::from)
            .ok_or_else(|| StoreError::NotFound {
                id: row.id_producto,
                user: self.user.clone(),
            })
    }

    /// Apply `patch` to one of the user's products.
    pub async fn update_product(
        &self,
        id: i64,
        patch: &ProductPatch,
    ) -> Result<ProductRecord, StoreError> {
        info!("Updating product {} for user {}", id, self.user);
        let request = self
            .request(Method::PATCH, &owned_product_query(id, &self.user))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);

        let rows: Vec<RawProduct> = self.send(request).await?;
        self.single_row(id, rows)
    }

    /// Delete one of the user's products and return what was removed.
    ///
    /// No matching row means the id is unknown or owned by someone else.
    pub async fn delete_product(&self, id: i64) -> Result<ProductRecord, StoreError> {
        info!("Deleting product {} for user {}", id, self.user);
        let request = self
            .request(Method::DELETE, &owned_product_query(id, &self.user))
            .header("Prefer", RETURN_REPRESENTATION);

        let rows: Vec<RawProduct> = self.send(request).await?;
        self.single_row(id, rows)
    }

    fn single_row(&self, id: i64, rows: Vec<RawProduct>) -> Result<ProductRecord, StoreError> {
        rows.into_iter()
            .next()
            .map(ProductRecord::from)
            .ok_or_else(|| StoreError::NotFound {
                id,
                user: self.user.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_config() -> StoreConfig {
        StoreConfig {
            url: "https://example.supabase.co/".to_string(),
            api_key: "anon-key".to_string(),
            user: Some("7".to_string()),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_new_builds_table_url() {
        let store = InventoryStore::new(&store_config()).unwrap();
        assert_eq!(store.table_url, "https://example.supabase.co/rest/v1/inventario");
        assert_eq!(store.user(), "7");
    }

    #[test]
    fn test_new_requires_settings() {
        let mut config = store_config();
        config.url = String::new();
        assert!(matches!(
            InventoryStore::new(&config),
            Err(StoreError::MissingSetting("store.url"))
        ));

        let mut config = store_config();
        config.api_key = "  ".to_string();
        assert!(matches!(
            InventoryStore::new(&config),
            Err(StoreError::MissingSetting("store.api_key"))
        ));

        let mut config = store_config();
        config.user = None;
        assert!(matches!(
            InventoryStore::new(&config),
            Err(StoreError::MissingSetting("store.user"))
        ));
    }

    #[test]
    fn test_new_rejects_non_http_url() {
        let mut config = store_config();
        config.url = "ftp://example.com".to_string();
        assert!(matches!(
            InventoryStore::new(&config),
            Err(StoreError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_queries() {
        assert_eq!(
            list_query("7"),
            vec![("select", "*".to_string()), ("id_usuario", "eq.7".to_string())]
        );
        assert_eq!(
            owned_product_query(12, "7"),
            vec![
                ("id_producto", "eq.12".to_string()),
                ("id_usuario", "eq.7".to_string())
            ]
        );
        assert!(max_id_query().contains(&("order", "id_producto.desc".to_string())));
        assert!(max_id_query().contains(&("limit", "1".to_string())));
    }

    #[test]
    fn test_request_carries_auth_headers() {
        let store = InventoryStore::new(&store_config()).unwrap();
        let request = store
            .request(Method::GET, &list_query(store.user()))
            .build()
            .unwrap();

        assert_eq!(request.headers()["apikey"], "anon-key");
        assert_eq!(request.headers()["authorization"], "Bearer anon-key");
        assert_eq!(
            request.url().as_str(),
            "https://example.supabase.co/rest/v1/inventario?select=*&id_usuario=eq.7"
        );
    }

    #[test]
    fn test_not_found_message() {
        let store = InventoryStore::new(&store_config()).unwrap();
        let err = store.single_row(5, Vec::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Product 5 was not found or does not belong to user 7"
        );
    }
}
