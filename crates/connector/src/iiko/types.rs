//! iiko Cloud API request and response bodies.
//!
//! Only the fields the connector reads are modelled. Unknown fields are
//! ignored on deserialization, and list fields default to empty so a partial
//! response degrades to "nothing to import" instead of a parse failure.

use iiko_connector_core::{
    CityId, GroupId, ModifierId, OrganizationId, PosOrderId, PosProductId, SizeId, StreetId,
    TerminalGroupId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::delivery::Delivery;

// =============================================================================
// Authentication
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessTokenRequest<'a> {
    pub api_login: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub token: String,
}

/// Error body returned by iiko on non-success status codes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

// =============================================================================
// Organizations & terminal groups
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrganizationsRequest {
    pub organization_ids: Option<Vec<OrganizationId>>,
    pub return_additional_info: bool,
    pub include_disabled: bool,
}

/// `organizations` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationsResponse {
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

/// An iiko organization (restaurant or chain tenant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrganizationIdsRequest<'a> {
    pub organization_ids: [&'a OrganizationId; 1],
}

/// `terminal_groups` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalGroupsResponse {
    #[serde(default)]
    pub terminal_groups: Vec<TerminalGroupsByOrganization>,
}

impl TerminalGroupsResponse {
    /// True when no organization reports any terminal group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terminal_groups.iter().all(|g| g.items.is_empty())
    }
}

/// Terminal groups of one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalGroupsByOrganization {
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub items: Vec<TerminalGroup>,
}

/// A delivery terminal group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalGroup {
    pub id: TerminalGroupId,
    pub organization_id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// Nomenclature
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NomenclatureRequest<'a> {
    pub organization_id: &'a OrganizationId,
    pub start_revision: Option<i64>,
}

/// `nomenclature` response: the full menu catalog of an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nomenclature {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub sizes: Vec<Size>,
    #[serde(default)]
    pub revision: i64,
}

/// A nomenclature group (menu category or modifier group).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default = "empty_group_id")]
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_group: Option<GroupId>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_group_modifier: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Group {
    /// Minimal group, used by tests and fixtures.
    #[must_use]
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            parent_group: None,
            order: 0,
            is_group_modifier: false,
            is_deleted: false,
        }
    }
}

fn empty_group_id() -> GroupId {
    GroupId::new("")
}

/// Kind of a nomenclature product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductType {
    #[default]
    Dish,
    Good,
    Modifier,
    Service,
    #[serde(other)]
    Other,
}

/// A nomenclature product: dish, good, or modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default = "empty_product_id")]
    pub id: PosProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ProductType,
    #[serde(default)]
    pub parent_group: Option<GroupId>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub size_prices: Vec<SizePrice>,
    #[serde(default)]
    pub modifiers: Vec<ProductModifier>,
    #[serde(default)]
    pub group_modifiers: Vec<GroupModifier>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Product {
    /// Minimal dish in `parent_group`, used by tests and fixtures.
    #[must_use]
    pub fn new(
        id: impl Into<PosProductId>,
        name: impl Into<String>,
        parent_group: impl Into<GroupId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: None,
            description: None,
            kind: ProductType::Dish,
            parent_group: Some(parent_group.into()),
            order: 0,
            size_prices: Vec::new(),
            modifiers: Vec::new(),
            group_modifiers: Vec::new(),
            is_deleted: false,
        }
    }
}

fn empty_product_id() -> PosProductId {
    PosProductId::new("")
}

/// Price of a product in one size (or the only price when `size_id` is null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizePrice {
    #[serde(default)]
    pub size_id: Option<SizeId>,
    pub price: PriceInfo,
}

/// Price details of a size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_included_in_menu: bool,
}

const fn default_true() -> bool {
    true
}

/// A single modifier attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductModifier {
    pub id: ModifierId,
    #[serde(default)]
    pub default_amount: Option<i32>,
    #[serde(default)]
    pub min_amount: Option<i32>,
    #[serde(default)]
    pub max_amount: Option<i32>,
    #[serde(default)]
    pub required: Option<bool>,
}

/// A modifier group attached to a product, with its child modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupModifier {
    pub id: GroupId,
    #[serde(default)]
    pub min_amount: Option<i32>,
    #[serde(default)]
    pub max_amount: Option<i32>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub child_modifiers: Vec<ProductModifier>,
}

/// An entry of the size scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    pub id: SizeId,
    pub name: String,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

// =============================================================================
// Address classifier
// =============================================================================

/// `cities` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitiesResponse {
    #[serde(default)]
    pub cities: Vec<CitiesByOrganization>,
}

/// Cities known to one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitiesByOrganization {
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub items: Vec<City>,
}

/// A city of the address classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    pub name: String,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StreetsRequest<'a> {
    pub organization_id: &'a OrganizationId,
    pub city_id: &'a CityId,
}

/// `streets/by_city` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreetsResponse {
    #[serde(default)]
    pub streets: Vec<Street>,
}

/// A street of the address classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Street {
    pub id: StreetId,
    pub name: String,
    #[serde(default)]
    pub is_deleted: bool,
}

// =============================================================================
// Deliveries
// =============================================================================

/// `deliveries/create` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryRequest<'a> {
    pub organization_id: &'a OrganizationId,
    pub terminal_group_id: &'a TerminalGroupId,
    pub order: &'a Delivery,
}

/// `deliveries/create` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryResponse {
    #[serde(default)]
    pub correlation_id: Option<String>,
    pub order_info: OrderInfo,
}

/// Status of a delivery as tracked by iiko.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub id: PosOrderId,
    #[serde(default)]
    pub pos_id: Option<String>,
    #[serde(default)]
    pub external_number: Option<String>,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub creation_status: Option<String>,
    #[serde(default)]
    pub error_info: Option<serde_json::Value>,
    #[serde(default)]
    pub order: Option<serde_json::Value>,
}

/// `deliveries/by_id` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveriesByIdRequest<'a> {
    pub organization_id: &'a OrganizationId,
    pub order_ids: [&'a PosOrderId; 1],
}

/// `deliveries/by_id` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveriesByIdResponse {
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub orders: Vec<OrderInfo>,
}
