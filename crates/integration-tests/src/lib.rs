//! Integration test fixtures for the iiko connector.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p iiko-connector-integration-tests
//! ```
//!
//! Tests run against [`FakeIiko`] and the in-memory store, so neither an
//! iiko account nor a database is needed.
//!
//! # Test Categories
//!
//! - `import` - Nomenclature import through the catalog port
//! - `export` - Order export and delivery lookup
//! - `routes` - HTTP endpoints, envelopes and the admin guard

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, header};
use iiko_connector::config::DeliveryDefaults;
use iiko_connector::delivery::{BillingAddress, Delivery, LineItem, OrderSnapshot};
use iiko_connector::export::ExportDefaults;
use iiko_connector::iiko::{
    CitiesByOrganization, CitiesResponse, City, CreateDeliveryResponse, DeliveriesByIdResponse,
    Group, GroupModifier, IikoApi, IikoError, Nomenclature, OrderInfo, Organization,
    OrganizationsResponse, PriceInfo, Product, ProductModifier, ProductType, Size, SizePrice,
    Street, StreetsResponse, TerminalGroup, TerminalGroupsByOrganization, TerminalGroupsResponse,
};
use iiko_connector::nomenclature::NomenclatureCache;
use iiko_connector::state::{AppState, AppStateParts, Stores};
use iiko_connector::store::{CatalogStore, MemoryStore};
use iiko_connector_core::{
    CityId, GroupId, ModifierId, OrderId, OrderStatus, OrganizationId, PosOrderId, ProductId,
    SizeId, StreetId, TerminalGroupId,
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use tokio::sync::Mutex;

pub const ORGANIZATION_ID: &str = "7b9d5c1e-0f4a-4c43-9e25-3a3c1a2b4d5e";
pub const TERMINAL_GROUP_ID: &str = "1f0c2b3a-4d5e-4f60-8a7b-9c8d7e6f5a4b";
pub const CITY_ID: &str = "5e4d3c2b-1a09-4f8e-9d7c-6b5a49382716";
pub const STREET_ID: &str = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
pub const ADMIN_TOKEN: &str = "k3Jx9QvT2mWz7LpR5nYb8HcF4dGs6AeU";

/// A delivery received by [`FakeIiko::create_delivery`].
#[derive(Debug, Clone)]
pub struct CreatedDelivery {
    pub organization_id: OrganizationId,
    pub terminal_group_id: TerminalGroupId,
    pub delivery: Delivery,
}

/// In-memory stand-in for the iiko Cloud API.
#[derive(Debug, Default)]
pub struct FakeIiko {
    pub organizations: Vec<Organization>,
    pub terminal_groups: Vec<TerminalGroup>,
    pub nomenclature: Nomenclature,
    pub cities: Vec<City>,
    pub streets: Vec<Street>,
    created: Mutex<Vec<CreatedDelivery>>,
}

impl FakeIiko {
    /// One organization with one terminal, the sample menu and one city.
    #[must_use]
    pub fn new() -> Self {
        let organization_id = OrganizationId::new(ORGANIZATION_ID);
        Self {
            organizations: vec![Organization {
                id: organization_id.clone(),
                name: "Pizzeria".to_string(),
            }],
            terminal_groups: vec![TerminalGroup {
                id: TerminalGroupId::new(TERMINAL_GROUP_ID),
                organization_id,
                name: "Kitchen".to_string(),
                address: None,
            }],
            nomenclature: sample_nomenclature(),
            cities: vec![City {
                id: CityId::new(CITY_ID),
                name: "Kazan".to_string(),
                is_deleted: false,
            }],
            streets: vec![
                Street {
                    id: StreetId::new(STREET_ID),
                    name: "Lenina".to_string(),
                    is_deleted: false,
                },
                Street {
                    id: StreetId::new("0a1b2c3d-0000-4a6b-8c7d-9e0f1a2b3c4d"),
                    name: "Old street".to_string(),
                    is_deleted: true,
                },
            ],
            created: Mutex::default(),
        }
    }

    /// Deliveries received so far, in order.
    pub async fn created(&self) -> Vec<CreatedDelivery> {
        self.created.lock().await.clone()
    }

    fn order_info(organization_id: &OrganizationId, delivery_id: &str, status: &str) -> OrderInfo {
        OrderInfo {
            id: PosOrderId::new(delivery_id),
            pos_id: None,
            external_number: None,
            organization_id: Some(organization_id.clone()),
            timestamp: None,
            creation_status: Some(status.to_string()),
            error_info: None,
            order: None,
        }
    }
}

#[async_trait]
impl IikoApi for FakeIiko {
    async fn organizations(&self) -> Result<OrganizationsResponse, IikoError> {
        Ok(OrganizationsResponse {
            organizations: self.organizations.clone(),
        })
    }

    async fn terminal_groups(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<TerminalGroupsResponse, IikoError> {
        let items: Vec<TerminalGroup> = self
            .terminal_groups
            .iter()
            .filter(|t| &t.organization_id == organization_id)
            .cloned()
            .collect();
        Ok(TerminalGroupsResponse {
            terminal_groups: vec![TerminalGroupsByOrganization {
                organization_id: organization_id.clone(),
                items,
            }],
        })
    }

    async fn nomenclature(
        &self,
        _organization_id: &OrganizationId,
    ) -> Result<Nomenclature, IikoError> {
        Ok(self.nomenclature.clone())
    }

    async fn cities(&self, organization_id: &OrganizationId) -> Result<CitiesResponse, IikoError> {
        Ok(CitiesResponse {
            cities: vec![CitiesByOrganization {
                organization_id: organization_id.clone(),
                items: self.cities.clone(),
            }],
        })
    }

    async fn streets(
        &self,
        _organization_id: &OrganizationId,
        _city_id: &CityId,
    ) -> Result<StreetsResponse, IikoError> {
        Ok(StreetsResponse {
            streets: self.streets.clone(),
        })
    }

    async fn create_delivery(
        &self,
        organization_id: &OrganizationId,
        terminal_group_id: &TerminalGroupId,
        delivery: &Delivery,
    ) -> Result<CreateDeliveryResponse, IikoError> {
        self.created.lock().await.push(CreatedDelivery {
            organization_id: organization_id.clone(),
            terminal_group_id: terminal_group_id.clone(),
            delivery: delivery.clone(),
        });
        Ok(CreateDeliveryResponse {
            correlation_id: Some("corr-1".to_string()),
            order_info: Self::order_info(organization_id, &delivery.id, "InProgress"),
        })
    }

    async fn deliveries_by_id(
        &self,
        organization_id: &OrganizationId,
        order_id: &PosOrderId,
    ) -> Result<DeliveriesByIdResponse, IikoError> {
        let orders = self
            .created
            .lock()
            .await
            .iter()
            .filter(|c| c.delivery.id == order_id.as_str())
            .map(|c| Self::order_info(organization_id, &c.delivery.id, "Success"))
            .collect();
        Ok(DeliveriesByIdResponse {
            correlation_id: None,
            orders,
        })
    }
}

fn price(amount: i64) -> PriceInfo {
    PriceInfo {
        current_price: Some(Decimal::from(amount)),
        is_included_in_menu: true,
    }
}

fn single_price(amount: i64) -> Vec<SizePrice> {
    vec![SizePrice {
        size_id: None,
        price: price(amount),
    }]
}

/// Sample menu.
///
/// - `G1` Pizza: `P1` Margherita (Small/Large), `P3` Pepperoni (Extras: Cheese)
/// - `G2` Drinks: `P2` Cola
/// - `MG1` Extras (modifier group): `M1` Cheese
#[must_use]
pub fn sample_nomenclature() -> Nomenclature {
    let mut pizza = Group::new("G1", "Pizza");
    pizza.order = 1;
    let mut drinks = Group::new("G2", "Drinks");
    drinks.order = 2;
    let mut extras = Group::new("MG1", "Extras");
    extras.is_group_modifier = true;

    let mut margherita = Product::new("P1", "Margherita", "G1");
    margherita.size_prices = vec![
        SizePrice {
            size_id: Some(SizeId::new("S1")),
            price: price(400),
        },
        SizePrice {
            size_id: Some(SizeId::new("S2")),
            price: price(550),
        },
    ];

    let mut cola = Product::new("P2", "Cola", "G2");
    cola.kind = ProductType::Good;
    cola.size_prices = single_price(100);

    let mut pepperoni = Product::new("P3", "Pepperoni", "G1");
    pepperoni.size_prices = single_price(500);
    pepperoni.group_modifiers = vec![GroupModifier {
        id: GroupId::new("MG1"),
        min_amount: Some(0),
        max_amount: Some(1),
        required: Some(false),
        child_modifiers: vec![ProductModifier {
            id: ModifierId::new("M1"),
            default_amount: None,
            min_amount: Some(0),
            max_amount: Some(1),
            required: Some(false),
        }],
    }];

    let mut cheese = Product::new("M1", "Cheese", "MG1");
    cheese.kind = ProductType::Modifier;
    cheese.size_prices = single_price(50);

    Nomenclature {
        groups: vec![pizza, drinks, extras],
        products: vec![margherita, cola, pepperoni, cheese],
        sizes: vec![
            Size {
                id: SizeId::new("S1"),
                name: "Small".to_string(),
                priority: Some(1),
                is_default: Some(true),
            },
            Size {
                id: SizeId::new("S2"),
                name: "Large".to_string(),
                priority: Some(2),
                is_default: Some(false),
            },
        ],
        revision: 42,
    }
}

/// Export fallbacks pointing at the fake organization and terminal.
#[must_use]
pub fn export_defaults() -> ExportDefaults {
    ExportDefaults {
        organization_id: Some(OrganizationId::new(ORGANIZATION_ID)),
        terminal_group_id: Some(TerminalGroupId::new(TERMINAL_GROUP_ID)),
        delivery: DeliveryDefaults {
            street: "Default street".to_string(),
            city: "Moscow".to_string(),
        },
    }
}

/// Application state over the fake API and a shared in-memory store.
#[must_use]
pub fn app_state(iiko: Arc<FakeIiko>, store: Arc<MemoryStore>) -> AppState {
    let mut parts = AppStateParts::new(
        iiko,
        Stores::shared(store),
        NomenclatureCache::new(Duration::from_secs(3600)),
        SecretString::from(ADMIN_TOKEN),
    );
    parts.export_defaults = export_defaults();
    AppState::new(parts)
}

/// A processing courier order without line items.
#[must_use]
pub fn order_snapshot(id: i64) -> OrderSnapshot {
    OrderSnapshot {
        id: OrderId::new(id),
        status: OrderStatus::Processing,
        billing: BillingAddress {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            phone: "+7 (900) 123-45-67".to_string(),
            email: "ann@pizzeria.example".to_string(),
            address_1: "Lenina 5".to_string(),
            address_2: "12".to_string(),
            city: "Kazan".to_string(),
            postcode: "420000".to_string(),
        },
        customer_note: None,
        shipping_method_id: Some("flat_rate:1".to_string()),
        shipping_method_title: Some("Courier".to_string()),
        street_id: None,
        line_items: Vec::new(),
    }
}

/// Line item for an imported product, looked up by its iiko ID.
///
/// # Panics
///
/// Panics if the product has not been imported.
pub async fn line_item(catalog: &dyn CatalogStore, pos_product_id: &str, quantity: u32) -> LineItem {
    let product = catalog
        .products()
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|p| p.pos_product_id.as_str() == pos_product_id)
        .unwrap_or_else(|| panic!("product {pos_product_id} is not imported"));
    LineItem::new(product.name, product.id, quantity)
}

/// Line item for an imported variation with the given iiko size or modifier.
///
/// # Panics
///
/// Panics if no such variation has been imported.
pub async fn variation_line_item(
    catalog: &dyn CatalogStore,
    product_id: ProductId,
    size: Option<&str>,
    modifier: Option<&str>,
) -> LineItem {
    let variation = catalog
        .variations(product_id)
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|v| {
            v.pos_size_id.as_ref().map(SizeId::as_str) == size
                && v.pos_modifier_id.as_ref().map(ModifierId::as_str) == modifier
        })
        .unwrap_or_else(|| panic!("variation {size:?}/{modifier:?} is not imported"));

    let mut line = LineItem::new("Variation", product_id, 1);
    line.variation_id = Some(variation.id);
    line
}

/// JSON `POST` with the admin bearer token.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn admin_post(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|e| panic!("invalid request: {e}"))
}
