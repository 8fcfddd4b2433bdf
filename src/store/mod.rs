//! Access to product snapshots.
//!
//! Products come either from the hosted table (`client`) or from a JSON
//! export on disk (`snapshot`). Both paths hand back typed
//! `ProductRecord`s; nothing loosely typed leaves this module.

pub mod client;
pub mod rows;
pub mod snapshot;

pub use client::InventoryStore;
pub use rows::{ProductPatch, ProductRow};
pub use snapshot::{load_snapshot, save_snapshot};

use thiserror::Error;

/// Errors raised while talking to the hosted table.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store is not configured: {0} is missing")]
    MissingSetting(&'static str),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Request to store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode store response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Product {id} was not found or does not belong to user {user}")]
    NotFound { id: i64, user: String },
}
