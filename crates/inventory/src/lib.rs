//! Hotel inventory: item records, query filters and the backends that
//! serve them.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod http;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::{DEFAULT_BASE_URL, HttpInventory};
pub use memory::MemoryInventory;

/// A purchasable item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    pub id: u64,
    /// English name.
    pub name_en: String,
    /// Chinese name.
    pub name_cn: String,
    /// Category the item belongs to.
    pub category: String,
    /// Unit price.
    pub price: f64,
    /// Units in stock. Purchases may drive this below zero.
    pub quantity: i64,
}

/// Selects items from the inventory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemQuery {
    /// Every item.
    All,
    /// Items with one of these ids.
    Ids(Vec<u64>),
    /// Items in one of these categories.
    Categories(Vec<String>),
}

impl ItemQuery {
    /// Builds a query from comma separated filters.
    ///
    /// The id filter wins when both are given, and a filter without any
    /// non-empty segment counts as absent. Segments are trimmed. Ids that
    /// are not numbers can never match, so they are dropped here.
    pub fn from_csv(ids: Option<&str>, categories: Option<&str>) -> Self {
        let ids = ids.map(split_csv).unwrap_or_default();
        if !ids.is_empty() {
            return ItemQuery::Ids(
                ids.into_iter().filter_map(|id| id.parse().ok()).collect(),
            );
        }
        let categories = categories.map(split_csv).unwrap_or_default();
        if !categories.is_empty() {
            return ItemQuery::Categories(
                categories.into_iter().map(str::to_owned).collect(),
            );
        }
        ItemQuery::All
    }

    /// Returns `true` if `item` is selected by this query.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ItemQuery::All => true,
            ItemQuery::Ids(ids) => ids.contains(&item.id),
            ItemQuery::Categories(categories) => {
                categories.iter().any(|c| *c == item.category)
            }
        }
    }
}

fn split_csv(s: &str) -> Vec<&str> {
    s.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// The error type for inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No item has the requested id.
    #[error("item {0} not found")]
    NotFound(u64),

    /// The purchase would move the quantity out of range.
    #[error("purchasing {quantity} of item {id} overflows its quantity")]
    QuantityOverflow {
        /// Id of the item.
        id: u64,
        /// The requested quantity.
        quantity: i64,
    },

    /// The configured base URL is not usable.
    #[error("invalid inventory URL: {0}")]
    InvalidUrl(String),

    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The inventory API answered with an error status.
    #[error("inventory API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
}

/// A store of items.
///
/// Results keep the store order.
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    /// Returns the distinct categories, in the order they first appear.
    async fn categories(&self) -> Result<Vec<String>, InventoryError>;

    /// Returns the items selected by `query`.
    async fn get_items(
        &self,
        query: &ItemQuery,
    ) -> Result<Vec<Item>, InventoryError>;

    /// Deducts `quantity` units of item `id` and returns the updated item.
    ///
    /// The stock is not checked, so it may become negative.
    async fn purchase(
        &self,
        id: u64,
        quantity: i64,
    ) -> Result<Item, InventoryError>;
}
