//! Storefront order to iiko delivery mapping.
//!
//! [`DeliveryBuilder`] turns an [`OrderSnapshot`] into the `order` object of
//! a `deliveries/create` request. Mapping never fails: missing data is
//! recorded in the request [`Logs`] and the affected field is left blank or
//! the affected line is skipped.

pub mod hooks;
pub mod types;

pub use hooks::{DefaultHooks, DeliveryHooks};
pub use types::*;

use iiko_connector_core::{
    Email, Gender, OrderServiceType, digits_only, sanitize_key, truncate_chars,
};

use crate::config::DeliveryDefaults;
use crate::logs::Logs;

const LOG_SOURCE: &str = "create-delivery";

/// Placeholder iiko requires for mandatory text fields left blank.
pub const NOT_SET: &str = "NOT SET";

pub const MAX_PHONE_LEN: usize = 40;
pub const MAX_NAME_LEN: usize = 60;
pub const MAX_STREET_LEN: usize = 60;
pub const MAX_CITY_LEN: usize = 60;
pub const MAX_POSTCODE_LEN: usize = 10;
pub const MAX_HOUSE_LEN: usize = 10;

/// External (iiko-side) order identifier for a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalId {
    /// Previously saved against the order; reused so retries stay idempotent.
    Stored(String),
    /// Freshly generated; the caller must persist it.
    Generated(String),
}

impl ExternalId {
    /// Reuse a stored identifier or generate a UUID v4.
    #[must_use]
    pub fn resolve(stored: Option<&str>) -> Self {
        match stored.map(sanitize_key).filter(|id| !id.is_empty()) {
            Some(id) => Self::Stored(id),
            None => Self::Generated(uuid::Uuid::new_v4().to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stored(id) | Self::Generated(id) => id,
        }
    }

    #[must_use]
    pub const fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }
}

/// Maps storefront orders to iiko deliveries.
pub struct DeliveryBuilder<'a> {
    defaults: &'a DeliveryDefaults,
    hooks: &'a dyn DeliveryHooks,
}

impl<'a> DeliveryBuilder<'a> {
    pub fn new(defaults: &'a DeliveryDefaults, hooks: &'a dyn DeliveryHooks) -> Self {
        Self { defaults, hooks }
    }

    /// Build the delivery payload.
    pub fn build(&self, order: &OrderSnapshot, external_id: &ExternalId, logs: &mut Logs) -> Delivery {
        let service_type = OrderServiceType::from_shipping_method(order.shipping_method_id.as_deref());

        let phone = self.hooks.phone(digits_only(&order.billing.phone), order);
        let phone = if phone.is_empty() {
            logs.error(LOG_SOURCE, "User phone is empty.");
            phone
        } else {
            truncate_chars(&phone, MAX_PHONE_LEN)
        };

        // Free-form street text goes to the comment when no street ID is known.
        let mut street_audit = None;
        let delivery_point = if service_type.is_pickup() {
            None
        } else {
            let point = self.delivery_point(order, &mut street_audit);
            Some(self.hooks.delivery_point(point, order))
        };

        let comment = self.hooks.comment(comment(order, street_audit.as_deref()), order);

        Delivery {
            id: external_id.as_str().to_string(),
            complete_before: self.hooks.complete_before(order),
            phone,
            order_type_id: None,
            order_service_type: service_type,
            delivery_point,
            comment,
            customer: customer(order),
            guests: Some(self.hooks.guests(Guests::default(), order)),
            marketing_source_id: None,
            operator_id: None,
            items: order_items(order, logs),
            payments: self.hooks.payments(order),
        }
    }

    fn delivery_point(&self, order: &OrderSnapshot, street_audit: &mut Option<String>) -> DeliveryPoint {
        let billing = &order.billing;

        let street = match order.street_id.as_ref().filter(|id| !id.is_empty()) {
            Some(id) => StreetRef::Known { id: id.clone() },
            None => {
                if !billing.address_1.trim().is_empty() {
                    *street_audit = Some(billing.address_1.clone());
                }
                let city = non_blank(&billing.city)
                    .or_else(|| non_blank(&self.defaults.city))
                    .map(|city| truncate_chars(city, MAX_CITY_LEN));
                StreetRef::Named {
                    name: truncate_chars(&self.defaults.street, MAX_STREET_LEN),
                    city,
                }
            }
        };

        DeliveryPoint {
            coordinates: None,
            address: Address {
                street,
                index: non_blank(&billing.postcode).map(|p| truncate_chars(p, MAX_POSTCODE_LEN)),
                house: non_blank(&billing.address_2)
                    .map_or_else(|| NOT_SET.to_string(), |h| truncate_chars(h, MAX_HOUSE_LEN)),
                building: None,
                flat: None,
                entrance: None,
                floor: None,
                doorphone: None,
                region_id: None,
            },
            external_cartography_id: None,
            comment: None,
        }
    }
}

/// Non-empty parts joined by newlines: order ID, street text, customer note,
/// shipping method title.
fn comment(order: &OrderSnapshot, street_audit: Option<&str>) -> String {
    let order_id = order.id.to_string();
    [
        Some(order_id.as_str()),
        street_audit,
        order.customer_note.as_deref(),
        order.shipping_method_title.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}

fn customer(order: &OrderSnapshot) -> Customer {
    let billing = &order.billing;
    Customer {
        id: None,
        name: non_blank(&billing.first_name)
            .map_or_else(|| NOT_SET.to_string(), |n| truncate_chars(n, MAX_NAME_LEN)),
        surname: non_blank(&billing.last_name).map(|n| truncate_chars(n, MAX_NAME_LEN)),
        comment: None,
        birthdate: None,
        email: Email::sanitize(&billing.email),
        should_receive_promo_actions_info: false,
        gender: Gender::NotSpecified,
    }
}

fn order_items(order: &OrderSnapshot, logs: &mut Logs) -> Vec<OrderItem> {
    if order.line_items.is_empty() {
        logs.error(LOG_SOURCE, "No products in cart.");
        return Vec::new();
    }

    order
        .line_items
        .iter()
        .filter_map(|line| order_item(line, logs))
        .collect()
}

fn order_item(line: &LineItem, logs: &mut Logs) -> Option<OrderItem> {
    let Some(product_id) = line.pos_product_id.clone().filter(|id| !id.is_empty()) else {
        logs.notice(LOG_SOURCE, format!("Product {} does not have iiko ID.", line.name));
        return None;
    };

    let mut size_id = None;
    let mut modifiers = Vec::new();

    if line.is_variation() {
        size_id = line.pos_size_id.clone().filter(|id| !id.is_empty());
        let modifier_id = line.pos_modifier_id.clone().filter(|id| !id.is_empty());

        if size_id.is_none() && modifier_id.is_none() {
            logs.notice(
                LOG_SOURCE,
                format!(
                    "Variation {} does not have iiko size ID and iiko modifier ID.",
                    line.name
                ),
            );
            return None;
        }

        if let Some(modifier_id) = modifier_id {
            modifiers.push(ItemModifier {
                product_id: modifier_id,
                amount: 1,
                product_group_id: line.pos_modifier_group_id.clone().filter(|id| !id.is_empty()),
            });
        }
    }

    Some(OrderItem {
        product_id,
        modifiers,
        price: None,
        position_id: None,
        kind: "Product".to_string(),
        amount: f64::from(line.quantity),
        product_size_id: size_id,
        combo_information: None,
        comment: None,
    })
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
