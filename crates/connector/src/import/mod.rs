//! Nomenclature import into the storefront catalog.
//!
//! Two phases, both reading only from the [`NomenclatureCache`]:
//!
//! 1. **Groups**: the chosen iiko groups become storefront categories.
//! 2. **Products**: dishes and goods whose parent group was imported become
//!    products, with one variation per size, per modifier, or per
//!    (size, modifier) pair.
//!
//! Every record is upserted by its iiko key, so re-running an import updates
//! the catalog in place. A failure on one group or product is logged as a
//! warning and the run continues.

pub mod conversions;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use iiko_connector_core::{CategoryId, GroupId, ProductId};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::iiko::Product;
use crate::logs::Logs;
use crate::nomenclature::{CacheKey, NomenclatureCache};
use crate::store::{CatalogStore, ChosenGroups, ProductKind, SettingsStore, StoreError};

use conversions::Lookups;

const LOG_SOURCE: &str = "import";

/// Errors that abort an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cached {0} list is empty. Refresh the nomenclature first.")]
    EmptyCache(&'static str),

    #[error("No groups chosen and no saved selection.")]
    NoGroupsSelected,

    #[error("No imported groups.")]
    NoImportedGroups,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Storefront category ID -> iiko group ID, for every imported category.
pub type CategoryMap = BTreeMap<CategoryId, GroupId>;

/// Result of a full import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported_groups: usize,
    pub imported_products: usize,
}

/// Imports cached nomenclature through the catalog port.
pub struct Importer<'a> {
    cache: &'a NomenclatureCache,
    catalog: &'a dyn CatalogStore,
    settings: &'a dyn SettingsStore,
}

impl<'a> Importer<'a> {
    pub fn new(
        cache: &'a NomenclatureCache,
        catalog: &'a dyn CatalogStore,
        settings: &'a dyn SettingsStore,
    ) -> Self {
        Self {
            cache,
            catalog,
            settings,
        }
    }

    /// Import groups, then the products of the imported groups.
    ///
    /// `chosen` overrides the saved group selection; `None` or an empty
    /// selection falls back to it.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` when there is nothing to import or the store
    /// cannot be read.
    #[instrument(skip_all)]
    pub async fn import_nomenclature(
        &self,
        chosen: Option<&[GroupId]>,
        logs: &mut Logs,
    ) -> Result<ImportSummary, ImportError> {
        let categories = self.import_groups(chosen, logs).await?;

        if categories.is_empty() {
            return Err(ImportError::NoImportedGroups);
        }

        let imported_products = self.import_products(&categories, logs).await?;

        let summary = ImportSummary {
            imported_groups: categories.len(),
            imported_products,
        };
        tracing::info!(
            groups = summary.imported_groups,
            products = summary.imported_products,
            "Nomenclature import finished"
        );
        Ok(summary)
    }

    /// Create or update a category for each chosen group.
    ///
    /// The selection is saved (as a name -> ID map) only when a usable
    /// `chosen` list was passed in and at least one of its groups is cached.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` if the cached groups list is empty or no
    /// selection is available.
    pub async fn import_groups(
        &self,
        chosen: Option<&[GroupId]>,
        logs: &mut Logs,
    ) -> Result<CategoryMap, ImportError> {
        let groups = self
            .cache
            .groups()
            .await
            .filter(|groups| !groups.is_empty())
            .ok_or(ImportError::EmptyCache(CacheKey::Groups.label()))?;

        let requested: Option<Vec<GroupId>> = chosen
            .map(|ids| ids.iter().filter(|id| !id.is_empty()).cloned().collect::<Vec<_>>())
            .filter(|ids| !ids.is_empty());

        let group_ids = match &requested {
            Some(ids) => ids.clone(),
            None => self.settings.chosen_groups().await?.into_values().collect(),
        };

        if group_ids.is_empty() {
            return Err(ImportError::NoGroupsSelected);
        }

        let mut categories = CategoryMap::new();
        let mut chosen_groups = ChosenGroups::new();

        for group_id in &group_ids {
            let Some(group) = groups.iter().find(|g| &g.id == group_id) else {
                logs.warning(
                    LOG_SOURCE,
                    format!("Group {group_id} is not in the cached nomenclature."),
                );
                continue;
            };

            chosen_groups.insert(group.name.trim().to_string(), group.id.clone());

            match self.catalog.upsert_category(&conversions::category(group)).await {
                Ok(category_id) => {
                    categories.insert(category_id, group.id.clone());
                }
                Err(e) => logs.warning(
                    LOG_SOURCE,
                    format!("Cannot import group {}: {e}", group.name),
                ),
            }
        }

        if requested.is_some()
            && !chosen_groups.is_empty()
            && let Err(e) = self.settings.save_chosen_groups(&chosen_groups).await
        {
            logs.error(LOG_SOURCE, format!("Cannot save chosen groups: {e}"));
        }

        Ok(categories)
    }

    /// Create or update the products of the given categories.
    ///
    /// Returns the number of products written. Per-product failures are
    /// logged as warnings.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` if the store cannot be reached.
    pub async fn import_products(
        &self,
        categories: &CategoryMap,
        logs: &mut Logs,
    ) -> Result<usize, ImportError> {
        let simple_groups = self.cache.simple_groups().await.unwrap_or_default();
        let dishes = self.cache.products(CacheKey::Dishes).await.unwrap_or_default();
        let goods = self.cache.products(CacheKey::Goods).await.unwrap_or_default();
        let modifiers = self
            .cache
            .products(CacheKey::Modifiers)
            .await
            .unwrap_or_default();
        let sizes = self.cache.sizes().await.unwrap_or_default();

        let lookups = Lookups::new(&modifiers, &sizes, &simple_groups);
        let products = merge_products(&dishes, &goods);

        if products.is_empty() {
            logs.warning(LOG_SOURCE, "Products array is empty.");
            return Ok(0);
        }

        let mut imported = 0;
        for (category_id, group_id) in categories {
            for product in products
                .iter()
                .filter(|p| p.parent_group.as_ref() == Some(group_id))
            {
                match self.import_product(product, *category_id, &lookups).await {
                    Ok(_) => imported += 1,
                    Err(e) => logs.warning(
                        LOG_SOURCE,
                        format!("Cannot import product {}: {e}", product.name),
                    ),
                }
            }
        }

        Ok(imported)
    }

    async fn import_product(
        &self,
        product: &Product,
        category_id: CategoryId,
        lookups: &Lookups<'_>,
    ) -> Result<ProductId, StoreError> {
        // Plan against a placeholder ID first to learn the product kind.
        let planned = conversions::variations(product, ProductId::new(0), lookups);
        let kind = if planned.is_empty() {
            ProductKind::Simple
        } else {
            ProductKind::Variable
        };

        let product_id = self
            .catalog
            .upsert_product(&conversions::product(product, category_id, kind))
            .await?;

        let mut kept = Vec::with_capacity(planned.len());
        for mut variation in planned {
            variation.product_id = product_id;
            kept.push(self.catalog.upsert_variation(&variation).await?);
        }

        // Sizes or modifiers dropped in iiko leave no stale variations behind.
        let pruned = self.catalog.prune_variations(product_id, &kept).await?;
        if pruned > 0 {
            tracing::debug!(%product_id, pruned, "Stale variations removed");
        }

        tracing::debug!(pos_product_id = %product.id, %product_id, ?kind, "Product imported");
        Ok(product_id)
    }
}

/// Dishes followed by goods, without entries lacking an ID, one entry per ID
/// (the last occurrence wins, at the position of the first).
fn merge_products<'p>(dishes: &'p Arc<Vec<Product>>, goods: &'p Arc<Vec<Product>>) -> Vec<&'p Product> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_id: HashMap<&str, &Product> = HashMap::new();

    for product in dishes.iter().chain(goods.iter()) {
        if product.id.is_empty() {
            continue;
        }
        if by_id.insert(product.id.as_str(), product).is_none() {
            order.push(product.id.as_str());
        }
    }

    order.into_iter().filter_map(|id| by_id.get(id).copied()).collect()
}
