//! Settings stored as JSONB values under fixed keys.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::PgStore;
use crate::store::{ChosenGroups, PosSelection, SettingsStore, StoreError};

const CHOSEN_GROUPS_KEY: &str = "chosen_groups";
const POS_SELECTION_KEY: &str = "pos_selection";

impl PgStore {
    async fn get_setting<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        let value: Option<JsonValue> =
            sqlx::query_scalar("SELECT value FROM iiko.settings WHERE key = $1")
                .bind(key)
                .fetch_optional(self.pool())
                .await?;

        match value {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(T::default()),
        }
    }

    async fn set_setting<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        sqlx::query(
            r"
            INSERT INTO iiko.settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn chosen_groups(&self) -> Result<ChosenGroups, StoreError> {
        self.get_setting(CHOSEN_GROUPS_KEY).await
    }

    async fn save_chosen_groups(&self, groups: &ChosenGroups) -> Result<(), StoreError> {
        self.set_setting(CHOSEN_GROUPS_KEY, groups).await
    }

    async fn pos_selection(&self) -> Result<PosSelection, StoreError> {
        self.get_setting(POS_SELECTION_KEY).await
    }

    async fn save_pos_selection(&self, selection: &PosSelection) -> Result<(), StoreError> {
        self.set_setting(POS_SELECTION_KEY, selection).await
    }
}
