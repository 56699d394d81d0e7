//! Storage ports for settings, storefront catalog and orders.
//!
//! The importer and exporter only see these traits. Two implementations
//! exist: [`MemoryStore`] (tests, dry runs) and `db::PgStore` (`PostgreSQL`).

pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use iiko_connector_core::{
    CategoryId, CityId, GroupId, ModifierId, OrderId, OrganizationId, PosProductId, Price,
    ProductId, SizeId, TerminalGroupId, VariationId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::delivery::OrderSnapshot;

pub use memory::MemoryStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored JSON could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

// =============================================================================
// Settings
// =============================================================================

/// Administrator-selected groups, keyed by group name.
pub type ChosenGroups = BTreeMap<String, GroupId>;

/// Organization, terminal and city picked in the import screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosSelection {
    pub organization_id: Option<OrganizationId>,
    pub organization_name: Option<String>,
    pub terminal_group_id: Option<TerminalGroupId>,
    pub terminal_name: Option<String>,
    pub city_id: Option<CityId>,
    pub city_name: Option<String>,
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn chosen_groups(&self) -> Result<ChosenGroups, StoreError>;

    /// Replace the saved selection.
    async fn save_chosen_groups(&self, groups: &ChosenGroups) -> Result<(), StoreError>;

    async fn pos_selection(&self) -> Result<PosSelection, StoreError>;

    async fn save_pos_selection(&self, selection: &PosSelection) -> Result<(), StoreError>;
}

// =============================================================================
// Catalog
// =============================================================================

/// Category fields written by the importer. Keyed by `pos_group_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryUpsert {
    pub pos_group_id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub pos_group_id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Variable,
}

impl ProductKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Variable => "variable",
        }
    }

    /// Parse the stored representation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` for unknown values.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        match raw {
            "simple" => Ok(Self::Simple),
            "variable" => Ok(Self::Variable),
            other => Err(StoreError::DataCorruption(format!("unknown product kind: {other}"))),
        }
    }
}

/// Product fields written by the importer. Keyed by `pos_product_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpsert {
    pub pos_product_id: PosProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub kind: ProductKind,
    /// Regular price; `None` for variable products
    pub price: Option<Price>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub pos_product_id: PosProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub kind: ProductKind,
    pub price: Option<Price>,
    pub sort_order: i32,
}

/// Variation attribute, e.g. `Size = Large`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAttribute {
    pub name: String,
    pub value: String,
}

impl VariationAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Variation fields written by the importer.
///
/// Keyed by `(product_id, pos_size_id, pos_modifier_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationUpsert {
    pub product_id: ProductId,
    pub attributes: Vec<VariationAttribute>,
    pub price: Option<Price>,
    pub pos_size_id: Option<SizeId>,
    pub pos_modifier_id: Option<ModifierId>,
    pub pos_modifier_group_id: Option<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: VariationId,
    pub product_id: ProductId,
    pub attributes: Vec<VariationAttribute>,
    pub price: Option<Price>,
    pub pos_size_id: Option<SizeId>,
    pub pos_modifier_id: Option<ModifierId>,
    pub pos_modifier_group_id: Option<GroupId>,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Create or update a category, returning its storefront ID.
    async fn upsert_category(&self, category: &CategoryUpsert) -> Result<CategoryId, StoreError>;

    /// Create or update a product, returning its storefront ID.
    async fn upsert_product(&self, product: &ProductUpsert) -> Result<ProductId, StoreError>;

    /// Create or update a variation, returning its storefront ID.
    async fn upsert_variation(&self, variation: &VariationUpsert) -> Result<VariationId, StoreError>;

    /// Delete the variations of `product_id` whose IDs are not in `keep`,
    /// returning how many were removed.
    async fn prune_variations(&self, product_id: ProductId, keep: &[VariationId]) -> Result<u64, StoreError>;

    async fn categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn products(&self) -> Result<Vec<Product>, StoreError>;

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn variations(&self, product_id: ProductId) -> Result<Vec<Variation>, StoreError>;

    async fn variation(&self, id: VariationId) -> Result<Option<Variation>, StoreError>;
}

// =============================================================================
// Orders
// =============================================================================

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn order(&self, id: OrderId) -> Result<Option<OrderSnapshot>, StoreError>;

    /// Insert or replace the snapshot. Keeps any saved iiko order ID.
    async fn save_order(&self, order: &OrderSnapshot) -> Result<(), StoreError>;

    /// External ID previously sent to iiko for this order.
    async fn pos_order_id(&self, id: OrderId) -> Result<Option<String>, StoreError>;

    async fn set_pos_order_id(&self, id: OrderId, pos_order_id: &str) -> Result<(), StoreError>;

    async fn add_note(&self, id: OrderId, note: &str) -> Result<(), StoreError>;

    async fn notes(&self, id: OrderId) -> Result<Vec<String>, StoreError>;
}
