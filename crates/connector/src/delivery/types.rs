//! Storefront order snapshot (input) and iiko delivery payload (output).

use iiko_connector_core::{
    Email, Gender, GroupId, ModifierId, OrderId, OrderServiceType, OrderStatus, PosProductId,
    ProductId, SizeId, StreetId, VariationId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Storefront order snapshot
// =============================================================================

/// A placed storefront order, as far as delivery mapping needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub billing: BillingAddress,
    #[serde(default)]
    pub customer_note: Option<String>,
    /// Chosen shipping method ID, e.g. `flat_rate:1` or `local_pickup:3`
    #[serde(default)]
    pub shipping_method_id: Option<String>,
    #[serde(default)]
    pub shipping_method_title: Option<String>,
    /// iiko street picked at checkout, when the customer chose a known street
    #[serde(default)]
    pub street_id: Option<StreetId>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Billing fields. Blank strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub postcode: String,
}

/// An order line.
///
/// The iiko identifiers are resolved from catalog metadata before mapping;
/// callers may also supply them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub product_id: ProductId,
    #[serde(default)]
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    #[serde(default)]
    pub pos_product_id: Option<PosProductId>,
    #[serde(default)]
    pub pos_size_id: Option<SizeId>,
    #[serde(default)]
    pub pos_modifier_id: Option<ModifierId>,
    #[serde(default)]
    pub pos_modifier_group_id: Option<GroupId>,
}

impl LineItem {
    /// A simple (non-variation) line.
    pub fn new(name: impl Into<String>, product_id: ProductId, quantity: u32) -> Self {
        Self {
            name: name.into(),
            product_id,
            variation_id: None,
            quantity,
            pos_product_id: None,
            pos_size_id: None,
            pos_modifier_id: None,
            pos_modifier_group_id: None,
        }
    }

    #[must_use]
    pub const fn is_variation(&self) -> bool {
        self.variation_id.is_some()
    }
}

// =============================================================================
// iiko delivery payload (`deliveries/create` -> `order`)
// =============================================================================

/// Outbound delivery order. `None` fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: String,
    /// `yyyy-MM-dd HH:mm:ss.fff` in terminal local time; `null` means urgent
    pub complete_before: Option<String>,
    pub phone: String,
    pub order_type_id: Option<String>,
    pub order_service_type: OrderServiceType,
    pub delivery_point: Option<DeliveryPoint>,
    pub comment: String,
    pub customer: Customer,
    pub guests: Option<Guests>,
    pub marketing_source_id: Option<String>,
    pub operator_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub payments: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPoint {
    pub coordinates: Option<Coordinates>,
    pub address: Address,
    pub external_cartography_id: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: StreetRef,
    /// Postcode, at most 10 chars
    pub index: Option<String>,
    /// At most 10 chars
    pub house: String,
    pub building: Option<String>,
    pub flat: Option<String>,
    pub entrance: Option<String>,
    pub floor: Option<String>,
    pub doorphone: Option<String>,
    pub region_id: Option<String>,
}

/// iiko accepts either a classifier street ID or a free-form name and city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreetRef {
    Known { id: StreetId },
    Named { name: String, city: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Option<String>,
    pub name: String,
    pub surname: Option<String>,
    pub comment: Option<String>,
    pub birthdate: Option<String>,
    pub email: Option<Email>,
    pub should_receive_promo_actions_info: bool,
    pub gender: Gender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guests {
    /// Number of cutlery sets
    pub count: u32,
    pub split_between_persons: bool,
}

impl Default for Guests {
    fn default() -> Self {
        Self {
            count: 1,
            split_between_persons: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: PosProductId,
    pub modifiers: Vec<ItemModifier>,
    pub price: Option<Decimal>,
    pub position_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub product_size_id: Option<SizeId>,
    pub combo_information: Option<serde_json::Value>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemModifier {
    pub product_id: ModifierId,
    pub amount: u32,
    pub product_group_id: Option<GroupId>,
}
