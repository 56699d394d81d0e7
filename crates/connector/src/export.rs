//! Order export to iiko.
//!
//! Three flows share one [`Exporter`]:
//!
//! - order created: a storefront order snapshot is sent as a new delivery
//! - manual export: the same, for an order already in the store
//! - check: look up a previously sent delivery by its iiko order ID

use iiko_connector_core::{
    ModifierId, OrderId, OrderStatus, OrganizationId, PosOrderId, PosProductId, SizeId,
    TerminalGroupId,
};
use thiserror::Error;
use tracing::instrument;

use crate::config::{ConnectorConfig, DeliveryDefaults};
use crate::delivery::{DeliveryBuilder, DeliveryHooks, ExternalId, OrderSnapshot};
use crate::iiko::{CreateDeliveryResponse, DeliveriesByIdResponse, IikoApi, IikoError};
use crate::logs::Logs;
use crate::store::{CatalogStore, OrderStore, PosSelection, SettingsStore, StoreError};

const LOG_SOURCE: &str = "create-delivery";

/// Errors that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Order {0} not found.")]
    OrderNotFound(OrderId),

    #[error("Order {0} doesn't have iiko ID.")]
    MissingPosOrderId(OrderId),

    #[error("Organization is not selected.")]
    NoOrganization,

    #[error("Terminal group is not selected.")]
    NoTerminalGroup,

    #[error("Order {0} has no products that can be sent to iiko.")]
    NoItems(OrderId),

    #[error(transparent)]
    Iiko(#[from] IikoError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configured fallbacks for export.
#[derive(Debug, Clone, Default)]
pub struct ExportDefaults {
    pub organization_id: Option<OrganizationId>,
    pub terminal_group_id: Option<TerminalGroupId>,
    pub delivery: DeliveryDefaults,
}

impl ExportDefaults {
    #[must_use]
    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self {
            organization_id: config.iiko.organization_id.clone(),
            terminal_group_id: config.iiko.terminal_group_id.clone(),
            delivery: config.delivery.clone(),
        }
    }
}

/// Sends storefront orders to iiko.
pub struct Exporter<'a> {
    api: &'a dyn IikoApi,
    orders: &'a dyn OrderStore,
    catalog: &'a dyn CatalogStore,
    settings: &'a dyn SettingsStore,
    defaults: &'a ExportDefaults,
    hooks: &'a dyn DeliveryHooks,
}

impl<'a> Exporter<'a> {
    pub fn new(
        api: &'a dyn IikoApi,
        orders: &'a dyn OrderStore,
        catalog: &'a dyn CatalogStore,
        settings: &'a dyn SettingsStore,
        defaults: &'a ExportDefaults,
        hooks: &'a dyn DeliveryHooks,
    ) -> Self {
        Self {
            api,
            orders,
            catalog,
            settings,
            defaults,
            hooks,
        }
    }

    /// Export a newly created order. The snapshot is saved first so the
    /// generated iiko order ID and notes can be attached to it.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if no organization or terminal group is
    /// configured, the order has no exportable items, or a call fails.
    #[instrument(skip_all, fields(order_id = %order.id))]
    pub async fn export_delivery(
        &self,
        order: &OrderSnapshot,
        logs: &mut Logs,
    ) -> Result<CreateDeliveryResponse, ExportError> {
        self.orders.save_order(order).await?;
        self.export(order, logs).await
    }

    /// Export an order already in the store.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::OrderNotFound` for unknown orders, otherwise as
    /// [`Self::export_delivery`].
    #[instrument(skip(self, logs))]
    pub async fn export_order_manually(
        &self,
        order_id: OrderId,
        logs: &mut Logs,
    ) -> Result<CreateDeliveryResponse, ExportError> {
        let order = self
            .orders
            .order(order_id)
            .await?
            .ok_or(ExportError::OrderNotFound(order_id))?;
        self.export(&order, logs).await
    }

    /// Fetch the iiko state of a previously exported order.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::MissingPosOrderId` if the order was never sent.
    #[instrument(skip(self))]
    pub async fn check_created_delivery(
        &self,
        order_id: OrderId,
    ) -> Result<DeliveriesByIdResponse, ExportError> {
        let pos_order_id = self
            .orders
            .pos_order_id(order_id)
            .await?
            .filter(|id| !id.trim().is_empty())
            .ok_or(ExportError::MissingPosOrderId(order_id))?;

        let selection = self.settings.pos_selection().await?;
        let organization_id = self.organization_id(&selection)?;

        let response = self
            .api
            .deliveries_by_id(&organization_id, &PosOrderId::new(pos_order_id))
            .await?;
        tracing::debug!(orders = response.orders.len(), "check-delivery-response");
        Ok(response)
    }

    async fn export(
        &self,
        order: &OrderSnapshot,
        logs: &mut Logs,
    ) -> Result<CreateDeliveryResponse, ExportError> {
        if order.status == OrderStatus::Failed {
            logs.error(LOG_SOURCE, format!("Order {} has status 'failed'.", order.id));
        }

        let selection = self.settings.pos_selection().await?;
        let organization_id = self.organization_id(&selection)?;
        let terminal_group_id = selection
            .terminal_group_id
            .clone()
            .or_else(|| self.defaults.terminal_group_id.clone())
            .ok_or(ExportError::NoTerminalGroup)?;

        let order = self.resolve_line_items(order).await?;

        let stored = self.orders.pos_order_id(order.id).await?;
        let external_id = ExternalId::resolve(stored.as_deref());
        if external_id.is_generated() {
            self.orders
                .set_pos_order_id(order.id, external_id.as_str())
                .await?;
        }

        let mut address_defaults = self.defaults.delivery.clone();
        if address_defaults.city.trim().is_empty()
            && let Some(city) = selection.city_name
        {
            address_defaults.city = city;
        }

        let delivery = DeliveryBuilder::new(&address_defaults, self.hooks).build(
            &order,
            &external_id,
            logs,
        );

        if delivery.items.is_empty() {
            return Err(ExportError::NoItems(order.id));
        }

        self.orders
            .add_note(order.id, &format!("Iiko order ID: {}", delivery.id))
            .await?;

        let response = self
            .api
            .create_delivery(&organization_id, &terminal_group_id, &delivery)
            .await?;

        tracing::debug!(
            response = %serde_json::to_string(&response).unwrap_or_default(),
            "create-delivery-response"
        );
        tracing::info!(
            iiko_order_id = %response.order_info.id,
            status = ?response.order_info.creation_status,
            "Delivery created"
        );
        Ok(response)
    }

    fn organization_id(&self, selection: &PosSelection) -> Result<OrganizationId, ExportError> {
        selection
            .organization_id
            .clone()
            .or_else(|| self.defaults.organization_id.clone())
            .ok_or(ExportError::NoOrganization)
    }

    /// Fill missing iiko identifiers of line items from catalog metadata.
    async fn resolve_line_items(&self, order: &OrderSnapshot) -> Result<OrderSnapshot, StoreError> {
        let mut order = order.clone();

        for line in &mut order.line_items {
            if line.pos_product_id.as_ref().is_none_or(PosProductId::is_empty)
                && let Some(product) = self.catalog.product(line.product_id).await?
            {
                line.pos_product_id = Some(product.pos_product_id);
            }

            if let Some(variation_id) = line.variation_id
                && line.pos_size_id.as_ref().is_none_or(SizeId::is_empty)
                && line.pos_modifier_id.as_ref().is_none_or(ModifierId::is_empty)
                && let Some(variation) = self.catalog.variation(variation_id).await?
            {
                line.pos_size_id = variation.pos_size_id;
                line.pos_modifier_id = variation.pos_modifier_id;
                line.pos_modifier_group_id = variation.pos_modifier_group_id;
            }
        }

        Ok(order)
    }
}
