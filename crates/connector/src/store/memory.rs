//! In-memory store implementing every storage port.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use iiko_connector_core::{CategoryId, OrderId, ProductId, VariationId};
use tokio::sync::Mutex;

use super::{
    CatalogStore, Category, CategoryUpsert, ChosenGroups, OrderStore, PosSelection, Product,
    ProductUpsert, SettingsStore, StoreError, Variation, VariationUpsert,
};
use crate::delivery::OrderSnapshot;

#[derive(Debug, Default)]
struct State {
    chosen_groups: ChosenGroups,
    selection: PosSelection,
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    variations: BTreeMap<VariationId, Variation>,
    orders: HashMap<OrderId, StoredOrder>,
    next_id: i64,
}

#[derive(Debug)]
struct StoredOrder {
    snapshot: OrderSnapshot,
    pos_order_id: Option<String>,
    notes: Vec<String>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store. Data is lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn chosen_groups(&self) -> Result<ChosenGroups, StoreError> {
        Ok(self.state.lock().await.chosen_groups.clone())
    }

    async fn save_chosen_groups(&self, groups: &ChosenGroups) -> Result<(), StoreError> {
        self.state.lock().await.chosen_groups.clone_from(groups);
        Ok(())
    }

    async fn pos_selection(&self) -> Result<PosSelection, StoreError> {
        Ok(self.state.lock().await.selection.clone())
    }

    async fn save_pos_selection(&self, selection: &PosSelection) -> Result<(), StoreError> {
        self.state.lock().await.selection.clone_from(selection);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn upsert_category(&self, category: &CategoryUpsert) -> Result<CategoryId, StoreError> {
        let mut state = self.state.lock().await;
        let existing = state
            .categories
            .values()
            .find(|c| c.pos_group_id == category.pos_group_id)
            .map(|c| c.id);
        let id = match existing {
            Some(id) => id,
            None => CategoryId::new(state.allocate_id()),
        };

        state.categories.insert(
            id,
            Category {
                id,
                pos_group_id: category.pos_group_id.clone(),
                name: category.name.clone(),
                description: category.description.clone(),
                sort_order: category.sort_order,
            },
        );
        Ok(id)
    }

    async fn upsert_product(&self, product: &ProductUpsert) -> Result<ProductId, StoreError> {
        let mut state = self.state.lock().await;
        if !state.categories.contains_key(&product.category_id) {
            return Err(StoreError::NotFound(format!("category {}", product.category_id)));
        }

        let existing = state
            .products
            .values()
            .find(|p| p.pos_product_id == product.pos_product_id)
            .map(|p| p.id);
        let id = match existing {
            Some(id) => id,
            None => ProductId::new(state.allocate_id()),
        };

        state.products.insert(
            id,
            Product {
                id,
                pos_product_id: product.pos_product_id.clone(),
                category_id: product.category_id,
                name: product.name.clone(),
                sku: product.sku.clone(),
                description: product.description.clone(),
                kind: product.kind,
                price: product.price,
                sort_order: product.sort_order,
            },
        );
        Ok(id)
    }

    async fn upsert_variation(&self, variation: &VariationUpsert) -> Result<VariationId, StoreError> {
        let mut state = self.state.lock().await;
        if !state.products.contains_key(&variation.product_id) {
            return Err(StoreError::NotFound(format!("product {}", variation.product_id)));
        }

        let existing = state
            .variations
            .values()
            .find(|v| {
                v.product_id == variation.product_id
                    && v.pos_size_id == variation.pos_size_id
                    && v.pos_modifier_id == variation.pos_modifier_id
            })
            .map(|v| v.id);
        let id = match existing {
            Some(id) => id,
            None => VariationId::new(state.allocate_id()),
        };

        state.variations.insert(
            id,
            Variation {
                id,
                product_id: variation.product_id,
                attributes: variation.attributes.clone(),
                price: variation.price,
                pos_size_id: variation.pos_size_id.clone(),
                pos_modifier_id: variation.pos_modifier_id.clone(),
                pos_modifier_group_id: variation.pos_modifier_group_id.clone(),
            },
        );
        Ok(id)
    }

    async fn prune_variations(&self, product_id: ProductId, keep: &[VariationId]) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.variations.len();
        state
            .variations
            .retain(|id, v| v.product_id != product_id || keep.contains(id));
        Ok(u64::try_from(before - state.variations.len()).unwrap_or_default())
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.state.lock().await.categories.values().cloned().collect())
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.state.lock().await.products.values().cloned().collect())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn variations(&self, product_id: ProductId) -> Result<Vec<Variation>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .variations
            .values()
            .filter(|v| v.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn variation(&self, id: VariationId) -> Result<Option<Variation>, StoreError> {
        Ok(self.state.lock().await.variations.get(&id).cloned())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn order(&self, id: OrderId) -> Result<Option<OrderSnapshot>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .orders
            .get(&id)
            .map(|o| o.snapshot.clone()))
    }

    async fn save_order(&self, order: &OrderSnapshot) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        match state.orders.get_mut(&order.id) {
            Some(stored) => stored.snapshot = order.clone(),
            None => {
                state.orders.insert(
                    order.id,
                    StoredOrder {
                        snapshot: order.clone(),
                        pos_order_id: None,
                        notes: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn pos_order_id(&self, id: OrderId) -> Result<Option<String>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .orders
            .get(&id)
            .and_then(|o| o.pos_order_id.clone()))
    }

    async fn set_pos_order_id(&self, id: OrderId, pos_order_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;
        order.pos_order_id = Some(pos_order_id.to_string());
        Ok(())
    }

    async fn add_note(&self, id: OrderId, note: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;
        order.notes.push(note.to_string());
        Ok(())
    }

    async fn notes(&self, id: OrderId) -> Result<Vec<String>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .orders
            .get(&id)
            .map(|o| o.notes.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use iiko_connector_core::{GroupId, PosProductId, SizeId};

    use super::*;
    use crate::store::{ProductKind, VariationAttribute};

    fn pizza_category() -> CategoryUpsert {
        CategoryUpsert {
            pos_group_id: GroupId::new("G1"),
            name: "Pizza".to_string(),
            description: None,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn test_category_upsert_is_keyed_by_group() {
        let store = MemoryStore::new();
        let first = store.upsert_category(&pizza_category()).await.unwrap();

        let mut renamed = pizza_category();
        renamed.name = "Pizzas".to_string();
        let second = store.upsert_category(&renamed).await.unwrap();

        assert_eq!(first, second);
        let categories = store.categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Pizzas");
    }

    #[tokio::test]
    async fn test_variation_upsert_is_keyed_by_size_and_modifier() {
        let store = MemoryStore::new();
        let category_id = store.upsert_category(&pizza_category()).await.unwrap();
        let product_id = store
            .upsert_product(&ProductUpsert {
                pos_product_id: PosProductId::new("P1"),
                category_id,
                name: "Margherita".to_string(),
                sku: None,
                description: None,
                kind: ProductKind::Variable,
                price: None,
                sort_order: 0,
            })
            .await
            .unwrap();

        let variation = VariationUpsert {
            product_id,
            attributes: vec![VariationAttribute::new("Size", "Large")],
            price: None,
            pos_size_id: Some(SizeId::new("S1")),
            pos_modifier_id: None,
            pos_modifier_group_id: None,
        };
        let a = store.upsert_variation(&variation).await.unwrap();
        let b = store.upsert_variation(&variation).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(store.variations(product_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prune_keeps_listed_variations_of_product() {
        let store = MemoryStore::new();
        let category_id = store.upsert_category(&pizza_category()).await.unwrap();
        let product_id = store
            .upsert_product(&ProductUpsert {
                pos_product_id: PosProductId::new("P1"),
                category_id,
                name: "Margherita".to_string(),
                sku: None,
                description: None,
                kind: ProductKind::Variable,
                price: None,
                sort_order: 0,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for size in ["S1", "S2"] {
            let variation = VariationUpsert {
                product_id,
                attributes: vec![VariationAttribute::new("Size", size)],
                price: None,
                pos_size_id: Some(SizeId::new(size)),
                pos_modifier_id: None,
                pos_modifier_group_id: None,
            };
            ids.push(store.upsert_variation(&variation).await.unwrap());
        }

        assert_eq!(store.prune_variations(product_id, &ids[..1]).await.unwrap(), 1);
        let left = store.variations(product_id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, ids[0]);

        assert_eq!(store.prune_variations(product_id, &[]).await.unwrap(), 1);
        assert!(store.variations(product_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_requires_existing_category() {
        let store = MemoryStore::new();
        let result = store
            .upsert_product(&ProductUpsert {
                pos_product_id: PosProductId::new("P1"),
                category_id: CategoryId::new(99),
                name: "Orphan".to_string(),
                sku: None,
                description: None,
                kind: ProductKind::Simple,
                price: None,
                sort_order: 0,
            })
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
