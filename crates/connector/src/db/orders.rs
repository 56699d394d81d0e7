//! Order snapshots, iiko order IDs and notes.

use async_trait::async_trait;
use iiko_connector_core::OrderId;
use sqlx::types::Json;

use super::PgStore;
use crate::delivery::OrderSnapshot;
use crate::store::{OrderStore, StoreError};

#[async_trait]
impl OrderStore for PgStore {
    async fn order(&self, id: OrderId) -> Result<Option<OrderSnapshot>, StoreError> {
        let snapshot: Option<Json<OrderSnapshot>> =
            sqlx::query_scalar("SELECT snapshot FROM iiko.orders WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        Ok(snapshot.map(|json| json.0))
    }

    async fn save_order(&self, order: &OrderSnapshot) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO iiko.orders (id, snapshot)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET snapshot = EXCLUDED.snapshot, updated_at = NOW()
            ",
        )
        .bind(order.id)
        .bind(Json(order))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn pos_order_id(&self, id: OrderId) -> Result<Option<String>, StoreError> {
        let pos_order_id: Option<Option<String>> =
            sqlx::query_scalar("SELECT pos_order_id FROM iiko.orders WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        Ok(pos_order_id.flatten())
    }

    async fn set_pos_order_id(&self, id: OrderId, pos_order_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE iiko.orders SET pos_order_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(pos_order_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("order {id}")));
        }
        Ok(())
    }

    async fn add_note(&self, id: OrderId, note: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO iiko.order_notes (order_id, note) VALUES ($1, $2)")
            .bind(id)
            .bind(note)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn notes(&self, id: OrderId) -> Result<Vec<String>, StoreError> {
        let notes: Vec<String> =
            sqlx::query_scalar("SELECT note FROM iiko.order_notes WHERE order_id = $1 ORDER BY id")
                .bind(id)
                .fetch_all(self.pool())
                .await?;
        Ok(notes)
    }
}
