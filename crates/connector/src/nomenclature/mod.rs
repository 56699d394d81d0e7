//! Cached iiko nomenclature.
//!
//! A `nomenclature` response is split into six named lists (offered groups,
//! the flat groups list, dishes, goods, modifiers, sizes) and each list is
//! kept in its own `moka` entry until the TTL elapses or the next refresh
//! overwrites it. The importer reads only from this cache.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use iiko_connector_core::{GroupId, OrganizationId};
use moka::future::Cache;
use serde::Serialize;
use tracing::instrument;

use crate::iiko::{Group, IikoApi, IikoError, Nomenclature, Product, ProductType, Size};

pub use cache::{CacheKey, CacheValue};

/// Flat group entry, used to name modifier-group attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleGroup {
    pub id: GroupId,
    pub name: String,
    pub parent_group: Option<GroupId>,
}

/// A nomenclature response split into the cached lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NomenclatureLists {
    /// Groups that can become storefront categories
    pub groups: Vec<Group>,
    pub simple_groups: Vec<SimpleGroup>,
    pub dishes: Vec<Product>,
    pub goods: Vec<Product>,
    pub modifiers: Vec<Product>,
    pub sizes: Vec<Size>,
}

impl From<Nomenclature> for NomenclatureLists {
    fn from(nomenclature: Nomenclature) -> Self {
        let mut lists = Self::default();

        for group in nomenclature.groups.into_iter().filter(|g| !g.is_deleted) {
            lists.simple_groups.push(SimpleGroup {
                id: group.id.clone(),
                name: group.name.clone(),
                parent_group: group.parent_group.clone(),
            });
            if !group.is_group_modifier {
                lists.groups.push(group);
            }
        }

        for product in nomenclature.products.into_iter().filter(|p| !p.is_deleted) {
            match product.kind {
                ProductType::Dish => lists.dishes.push(product),
                ProductType::Good => lists.goods.push(product),
                ProductType::Modifier => lists.modifiers.push(product),
                ProductType::Service | ProductType::Other => {}
            }
        }

        lists.sizes = nomenclature.sizes;
        lists
    }
}

/// Response body of the nomenclature refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NomenclatureSummary {
    pub groups: Vec<Group>,
    pub dishes_count: usize,
    pub goods_count: usize,
    pub modifiers_count: usize,
    pub sizes_count: usize,
    pub revision: i64,
}

/// Shared nomenclature cache. Cheap to clone.
#[derive(Clone)]
pub struct NomenclatureCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl NomenclatureCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Fetch the organization's nomenclature and replace every cached list.
    ///
    /// # Errors
    ///
    /// Returns `IikoError` if the request fails. The cache is left untouched.
    #[instrument(skip(self, api), fields(organization_id = %organization_id))]
    pub async fn refresh(
        &self,
        api: &dyn IikoApi,
        organization_id: &OrganizationId,
    ) -> Result<NomenclatureSummary, IikoError> {
        let nomenclature = api.nomenclature(organization_id).await?;
        let revision = nomenclature.revision;
        let lists = NomenclatureLists::from(nomenclature);

        let summary = NomenclatureSummary {
            groups: lists.groups.clone(),
            dishes_count: lists.dishes.len(),
            goods_count: lists.goods.len(),
            modifiers_count: lists.modifiers.len(),
            sizes_count: lists.sizes.len(),
            revision,
        };

        self.store(lists).await;
        tracing::info!(
            groups = summary.groups.len(),
            dishes = summary.dishes_count,
            goods = summary.goods_count,
            revision,
            "Nomenclature cached"
        );
        Ok(summary)
    }

    /// Replace every cached list.
    pub async fn store(&self, lists: NomenclatureLists) {
        let entries = [
            (CacheKey::Groups, CacheValue::Groups(Arc::new(lists.groups))),
            (
                CacheKey::SimpleGroups,
                CacheValue::SimpleGroups(Arc::new(lists.simple_groups)),
            ),
            (CacheKey::Dishes, CacheValue::Products(Arc::new(lists.dishes))),
            (CacheKey::Goods, CacheValue::Products(Arc::new(lists.goods))),
            (CacheKey::Modifiers, CacheValue::Products(Arc::new(lists.modifiers))),
            (CacheKey::Sizes, CacheValue::Sizes(Arc::new(lists.sizes))),
        ];
        for (key, value) in entries {
            self.cache.insert(key, value).await;
        }
    }

    pub async fn groups(&self) -> Option<Arc<Vec<Group>>> {
        match self.cache.get(&CacheKey::Groups).await {
            Some(CacheValue::Groups(groups)) => Some(groups),
            _ => None,
        }
    }

    pub async fn simple_groups(&self) -> Option<Arc<Vec<SimpleGroup>>> {
        match self.cache.get(&CacheKey::SimpleGroups).await {
            Some(CacheValue::SimpleGroups(groups)) => Some(groups),
            _ => None,
        }
    }

    /// Cached dishes, goods or modifiers.
    pub async fn products(&self, key: CacheKey) -> Option<Arc<Vec<Product>>> {
        match self.cache.get(&key).await {
            Some(CacheValue::Products(products)) => Some(products),
            _ => None,
        }
    }

    pub async fn sizes(&self) -> Option<Arc<Vec<Size>>> {
        match self.cache.get(&CacheKey::Sizes).await {
            Some(CacheValue::Sizes(sizes)) => Some(sizes),
            _ => None,
        }
    }

    /// Invalidate all cached lists.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for NomenclatureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NomenclatureCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
