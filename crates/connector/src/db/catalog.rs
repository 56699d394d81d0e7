//! Storefront catalog tables.

use async_trait::async_trait;
use iiko_connector_core::{
    CategoryId, GroupId, ModifierId, PosProductId, Price, ProductId, SizeId, VariationId,
};
use rust_decimal::Decimal;
use sqlx::types::Json;

use super::PgStore;
use crate::store::{
    CatalogStore, Category, CategoryUpsert, Product, ProductKind, ProductUpsert, StoreError,
    Variation, VariationAttribute, VariationUpsert,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    pos_group_id: String,
    name: String,
    description: Option<String>,
    sort_order: i32,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            pos_group_id: GroupId::new(row.pos_group_id),
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    pos_product_id: String,
    category_id: i64,
    name: String,
    sku: Option<String>,
    description: Option<String>,
    kind: String,
    price: Option<Decimal>,
    sort_order: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            pos_product_id: PosProductId::new(row.pos_product_id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            sku: row.sku,
            description: row.description,
            kind: ProductKind::parse(&row.kind)?,
            price: row.price.map(Price::new),
            sort_order: row.sort_order,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VariationRow {
    id: i64,
    product_id: i64,
    attributes: Json<Vec<VariationAttribute>>,
    price: Option<Decimal>,
    pos_size_id: String,
    pos_modifier_id: String,
    pos_modifier_group_id: Option<String>,
}

impl From<VariationRow> for Variation {
    fn from(row: VariationRow) -> Self {
        Self {
            id: VariationId::new(row.id),
            product_id: ProductId::new(row.product_id),
            attributes: row.attributes.0,
            price: row.price.map(Price::new),
            pos_size_id: non_empty(row.pos_size_id).map(SizeId::new),
            pos_modifier_id: non_empty(row.pos_modifier_id).map(ModifierId::new),
            pos_modifier_group_id: row
                .pos_modifier_group_id
                .and_then(non_empty)
                .map(GroupId::new),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

const PRODUCT_COLUMNS: &str =
    "id, pos_product_id, category_id, name, sku, description, kind, price, sort_order";

const VARIATION_COLUMNS: &str = "id, product_id, attributes, price, pos_size_id, \
                                 pos_modifier_id, pos_modifier_group_id";

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl CatalogStore for PgStore {
    async fn upsert_category(&self, category: &CategoryUpsert) -> Result<CategoryId, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO iiko.categories (pos_group_id, name, description, sort_order)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (pos_group_id) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                sort_order = EXCLUDED.sort_order,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(&category.pos_group_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .fetch_one(self.pool())
        .await?;

        Ok(CategoryId::new(id))
    }

    async fn upsert_product(&self, product: &ProductUpsert) -> Result<ProductId, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO iiko.products
                (pos_product_id, category_id, name, sku, description, kind, price, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (pos_product_id) DO UPDATE
            SET category_id = EXCLUDED.category_id,
                name = EXCLUDED.name,
                sku = EXCLUDED.sku,
                description = EXCLUDED.description,
                kind = EXCLUDED.kind,
                price = EXCLUDED.price,
                sort_order = EXCLUDED.sort_order,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(&product.pos_product_id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.kind.as_str())
        .bind(product.price.map(|p| p.amount()))
        .bind(product.sort_order)
        .fetch_one(self.pool())
        .await?;

        Ok(ProductId::new(id))
    }

    async fn upsert_variation(&self, variation: &VariationUpsert) -> Result<VariationId, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO iiko.variations
                (product_id, attributes, price, pos_size_id, pos_modifier_id, pos_modifier_group_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (product_id, pos_size_id, pos_modifier_id) DO UPDATE
            SET attributes = EXCLUDED.attributes,
                price = EXCLUDED.price,
                pos_modifier_group_id = EXCLUDED.pos_modifier_group_id,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(variation.product_id)
        .bind(Json(&variation.attributes))
        .bind(variation.price.map(|p| p.amount()))
        .bind(variation.pos_size_id.as_ref().map_or("", SizeId::as_str))
        .bind(variation.pos_modifier_id.as_ref().map_or("", ModifierId::as_str))
        .bind(&variation.pos_modifier_group_id)
        .fetch_one(self.pool())
        .await?;

        Ok(VariationId::new(id))
    }

    async fn prune_variations(&self, product_id: ProductId, keep: &[VariationId]) -> Result<u64, StoreError> {
        let keep: Vec<i64> = keep.iter().map(VariationId::as_i64).collect();
        let result = sqlx::query(
            r"
            DELETE FROM iiko.variations
            WHERE product_id = $1 AND id <> ALL($2)
            ",
        )
        .bind(product_id)
        .bind(&keep)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r"
            SELECT id, pos_group_id, name, description, sort_order
            FROM iiko.categories
            ORDER BY sort_order, id
            ",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM iiko.products ORDER BY category_id, sort_order, id"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM iiko.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn variations(&self, product_id: ProductId) -> Result<Vec<Variation>, StoreError> {
        let rows: Vec<VariationRow> = sqlx::query_as(&format!(
            "SELECT {VARIATION_COLUMNS} FROM iiko.variations WHERE product_id = $1 ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn variation(&self, id: VariationId) -> Result<Option<Variation>, StoreError> {
        let row: Option<VariationRow> = sqlx::query_as(&format!(
            "SELECT {VARIATION_COLUMNS} FROM iiko.variations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }
}
