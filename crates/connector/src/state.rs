//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;

use crate::db::PgStore;
use crate::delivery::{DefaultHooks, DeliveryHooks};
use crate::export::{ExportDefaults, Exporter};
use crate::iiko::IikoApi;
use crate::import::Importer;
use crate::nomenclature::NomenclatureCache;
use crate::store::{CatalogStore, MemoryStore, OrderStore, SettingsStore};

/// The three storage ports, usually backed by one store.
#[derive(Clone)]
pub struct Stores {
    pub settings: Arc<dyn SettingsStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl Stores {
    #[must_use]
    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            settings: store.clone(),
            catalog: store.clone(),
            orders: store,
        }
    }

    #[must_use]
    pub fn memory() -> Self {
        Self::shared(Arc::new(MemoryStore::new()))
    }

    /// Use one in-memory store for every port, e.g. to inspect it in tests.
    #[must_use]
    pub fn shared(store: Arc<MemoryStore>) -> Self {
        Self {
            settings: store.clone(),
            catalog: store.clone(),
            orders: store,
        }
    }
}

/// Everything needed to build an [`AppState`].
pub struct AppStateParts {
    pub iiko: Arc<dyn IikoApi>,
    pub stores: Stores,
    pub nomenclature: NomenclatureCache,
    pub export_defaults: ExportDefaults,
    pub hooks: Arc<dyn DeliveryHooks>,
    pub admin_token: SecretString,
    /// Present when the stores are backed by `PostgreSQL`; used by readiness.
    pub pool: Option<PgPool>,
}

impl AppStateParts {
    /// Parts with default hooks and no database pool.
    #[must_use]
    pub fn new(
        iiko: Arc<dyn IikoApi>,
        stores: Stores,
        nomenclature: NomenclatureCache,
        admin_token: SecretString,
    ) -> Self {
        Self {
            iiko,
            stores,
            nomenclature,
            export_defaults: ExportDefaults::default(),
            hooks: Arc::new(DefaultHooks),
            admin_token,
            pool: None,
        }
    }
}

/// Application state shared across all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateParts>,
}

impl AppState {
    #[must_use]
    pub fn new(parts: AppStateParts) -> Self {
        Self {
            inner: Arc::new(parts),
        }
    }

    pub fn iiko(&self) -> &dyn IikoApi {
        self.inner.iiko.as_ref()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.inner.stores.settings.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.stores.catalog.as_ref()
    }

    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.stores.orders.as_ref()
    }

    #[must_use]
    pub fn nomenclature(&self) -> &NomenclatureCache {
        &self.inner.nomenclature
    }

    #[must_use]
    pub fn export_defaults(&self) -> &ExportDefaults {
        &self.inner.export_defaults
    }

    #[must_use]
    pub fn admin_token(&self) -> &SecretString {
        &self.inner.admin_token
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    pub fn importer(&self) -> Importer<'_> {
        Importer::new(self.nomenclature(), self.catalog(), self.settings())
    }

    pub fn exporter(&self) -> Exporter<'_> {
        Exporter::new(
            self.iiko(),
            self.orders(),
            self.catalog(),
            self.settings(),
            self.export_defaults(),
            self.inner.hooks.as_ref(),
        )
    }
}
