//! Integration tests for order export and delivery lookup.
//!
//! Orders reference products imported from the sample menu, and every
//! delivery sent to [`FakeIiko`] is recorded for inspection.

use std::time::Duration;

use iiko_connector::delivery::{DefaultHooks, LineItem, StreetRef};
use iiko_connector::export::{ExportDefaults, ExportError, Exporter};
use iiko_connector::import::Importer;
use iiko_connector::logs::{LogLevel, Logs};
use iiko_connector::nomenclature::NomenclatureCache;
use iiko_connector::store::{CatalogStore, MemoryStore, OrderStore, PosSelection, SettingsStore};
use iiko_connector_core::{
    GroupId, OrderId, OrderServiceType, OrderStatus, OrganizationId, PosProductId, ProductId, SizeId,
    StreetId, TerminalGroupId,
};
use iiko_connector_integration_tests::{
    FakeIiko, ORGANIZATION_ID, STREET_ID, TERMINAL_GROUP_ID, export_defaults, line_item,
    order_snapshot, variation_line_item,
};

/// Import the whole sample menu into `store`.
async fn import_menu(iiko: &FakeIiko, store: &MemoryStore) {
    let cache = NomenclatureCache::new(Duration::from_secs(60));
    cache
        .refresh(iiko, &OrganizationId::new(ORGANIZATION_ID))
        .await
        .expect("refresh failed");

    let mut logs = Logs::new();
    Importer::new(&cache, store, store)
        .import_nomenclature(Some(&[GroupId::new("G1"), GroupId::new("G2")]), &mut logs)
        .await
        .expect("import failed");
}

async fn product_id(store: &MemoryStore, pos_product_id: &str) -> ProductId {
    store
        .products()
        .await
        .expect("products")
        .into_iter()
        .find(|p| p.pos_product_id.as_str() == pos_product_id)
        .expect("product imported")
        .id
}

fn exporter<'a>(iiko: &'a FakeIiko, store: &'a MemoryStore, defaults: &'a ExportDefaults) -> Exporter<'a> {
    Exporter::new(iiko, store, store, store, defaults, &DefaultHooks)
}

// =============================================================================
// Order created
// =============================================================================

#[tokio::test]
async fn test_order_is_sent_with_pos_identifiers() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let margherita = product_id(&store, "P1").await;
    let mut order = order_snapshot(1001);
    order.line_items = vec![
        line_item(&store, "P2", 2).await,
        variation_line_item(&store, margherita, Some("S2"), None).await,
    ];

    let mut logs = Logs::new();
    let response = exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");
    assert!(!logs.has_errors());

    let created = iiko.created().await;
    assert_eq!(created.len(), 1);
    let sent = &created[0];
    assert_eq!(sent.organization_id, OrganizationId::new(ORGANIZATION_ID));
    assert_eq!(sent.terminal_group_id, TerminalGroupId::new(TERMINAL_GROUP_ID));

    let items = &sent.delivery.items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_id.as_str(), "P2");
    assert!((items[0].amount - 2.0).abs() < f64::EPSILON);
    assert_eq!(items[0].product_size_id, None);
    assert_eq!(items[1].product_id.as_str(), "P1");
    assert_eq!(items[1].product_size_id.as_ref().map(|s| s.as_str()), Some("S2"));
    assert!(items[1].modifiers.is_empty());

    assert_eq!(response.order_info.id.as_str(), sent.delivery.id);
    assert_eq!(sent.delivery.phone, "79001234567");
    assert_eq!(sent.delivery.order_service_type, OrderServiceType::DeliveryByCourier);
}

#[tokio::test]
async fn test_modifier_variation_is_sent_as_item_modifier() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let pepperoni = product_id(&store, "P3").await;
    let mut order = order_snapshot(1002);
    order.line_items = vec![variation_line_item(&store, pepperoni, None, Some("M1")).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let created = iiko.created().await;
    let item = &created[0].delivery.items[0];
    assert_eq!(item.product_id.as_str(), "P3");
    assert_eq!(item.product_size_id, None);
    assert_eq!(item.modifiers.len(), 1);
    assert_eq!(item.modifiers[0].product_id.as_str(), "M1");
    assert_eq!(item.modifiers[0].amount, 1);
    assert_eq!(item.modifiers[0].product_group_id, Some(GroupId::new("MG1")));
}

#[tokio::test]
async fn test_export_records_pos_order_id_and_note() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1003);
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let sent_id = iiko.created().await[0].delivery.id.clone();
    assert_eq!(sent_id.len(), 36, "generated ID is a UUID");

    let stored = store.pos_order_id(OrderId::new(1003)).await.expect("pos order id");
    assert_eq!(stored.as_deref(), Some(sent_id.as_str()));
    assert_eq!(
        store.notes(OrderId::new(1003)).await.expect("notes"),
        vec![format!("Iiko order ID: {sent_id}")]
    );
    assert!(store.order(OrderId::new(1003)).await.expect("order").is_some());
}

#[tokio::test]
async fn test_repeated_export_reuses_pos_order_id() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1004);
    order.line_items = vec![line_item(&store, "P2", 1).await];
    let exporter = exporter(&iiko, &store, &defaults);

    let mut logs = Logs::new();
    exporter
        .export_delivery(&order, &mut logs)
        .await
        .expect("first export failed");
    let mut logs = Logs::new();
    exporter
        .export_order_manually(OrderId::new(1004), &mut logs)
        .await
        .expect("second export failed");

    let created = iiko.created().await;
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].delivery.id, created[1].delivery.id);
}

#[tokio::test]
async fn test_stored_pos_order_id_is_used() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1005);
    order.line_items = vec![line_item(&store, "P2", 1).await];
    store.save_order(&order).await.expect("save order");
    store
        .set_pos_order_id(OrderId::new(1005), "ext-42")
        .await
        .expect("set pos order id");

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_order_manually(OrderId::new(1005), &mut logs)
        .await
        .expect("export failed");

    assert_eq!(iiko.created().await[0].delivery.id, "ext-42");
}

// =============================================================================
// Addresses
// =============================================================================

#[tokio::test]
async fn test_pickup_order_has_no_delivery_point() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1006);
    order.shipping_method_id = Some("local_pickup:3".to_string());
    order.shipping_method_title = Some("Pickup".to_string());
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let created = iiko.created().await;
    let delivery = &created[0].delivery;
    assert_eq!(delivery.order_service_type, OrderServiceType::DeliveryByClient);
    assert!(delivery.delivery_point.is_none());
    assert_eq!(delivery.comment, "1006\nPickup");
}

#[tokio::test]
async fn test_unknown_street_falls_back_to_default() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1007);
    order.billing.city = String::new();
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let created = iiko.created().await;
    let delivery = &created[0].delivery;
    let address = &delivery.delivery_point.as_ref().expect("delivery point").address;
    assert_eq!(
        address.street,
        StreetRef::Named {
            name: "Default street".to_string(),
            city: Some("Moscow".to_string()),
        }
    );
    assert_eq!(address.house, "12");
    assert_eq!(delivery.comment, "1007\nLenina 5\nCourier");
}

#[tokio::test]
async fn test_selected_city_is_the_last_fallback() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let mut defaults = export_defaults();
    defaults.delivery.city = String::new();
    store
        .save_pos_selection(&PosSelection {
            city_name: Some("Kazan".to_string()),
            ..PosSelection::default()
        })
        .await
        .expect("save selection");

    let mut order = order_snapshot(1008);
    order.billing.city = "  ".to_string();
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let created = iiko.created().await;
    let delivery = &created[0].delivery;
    let street = &delivery.delivery_point.as_ref().expect("delivery point").address.street;
    assert_eq!(
        street,
        &StreetRef::Named {
            name: "Default street".to_string(),
            city: Some("Kazan".to_string()),
        }
    );
}

#[tokio::test]
async fn test_known_street_is_sent_by_id() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1009);
    order.street_id = Some(StreetId::new(STREET_ID));
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let created = iiko.created().await;
    let delivery = &created[0].delivery;
    let address = &delivery.delivery_point.as_ref().expect("delivery point").address;
    assert_eq!(
        address.street,
        StreetRef::Known {
            id: StreetId::new(STREET_ID)
        }
    );
    assert_eq!(delivery.comment, "1009\nCourier");
}

#[tokio::test]
async fn test_long_fields_are_truncated() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1010);
    order.billing.first_name = "Анна".repeat(20);
    order.billing.address_2 = "12345678901234".to_string();
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let created = iiko.created().await;
    let delivery = &created[0].delivery;
    assert_eq!(delivery.customer.name.chars().count(), 60);
    let address = &delivery.delivery_point.as_ref().expect("delivery point").address;
    assert_eq!(address.house, "1234567890");
}

// =============================================================================
// Soft and hard failures
// =============================================================================

#[tokio::test]
async fn test_order_without_items_is_not_sent() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    let defaults = export_defaults();

    let mut logs = Logs::new();
    let result = exporter(&iiko, &store, &defaults)
        .export_delivery(&order_snapshot(1011), &mut logs)
        .await;

    assert!(matches!(result, Err(ExportError::NoItems(id)) if id == OrderId::new(1011)));
    assert_eq!(
        logs.messages(LogLevel::Error).collect::<Vec<_>>(),
        vec!["No products in cart."]
    );
    assert!(iiko.created().await.is_empty());
}

#[tokio::test]
async fn test_item_without_pos_id_is_skipped() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1012);
    order.line_items = vec![
        LineItem::new("Gift card", ProductId::new(9999), 1),
        line_item(&store, "P2", 1).await,
    ];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    assert_eq!(
        logs.messages(LogLevel::Notice).collect::<Vec<_>>(),
        vec!["Product Gift card does not have iiko ID."]
    );
    let created = iiko.created().await;
    assert_eq!(created[0].delivery.items.len(), 1);
    assert_eq!(created[0].delivery.items[0].product_id.as_str(), "P2");
}

#[tokio::test]
async fn test_blank_pos_ids_are_filled_from_catalog() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let margherita = product_id(&store, "P1").await;
    let mut cola = line_item(&store, "P2", 1).await;
    cola.pos_product_id = Some(PosProductId::new(""));
    let mut large = variation_line_item(&store, margherita, Some("S2"), None).await;
    large.pos_product_id = Some(PosProductId::new(""));
    large.pos_size_id = Some(SizeId::new(""));

    let mut order = order_snapshot(1019);
    order.line_items = vec![cola, large];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    assert!(logs.messages(LogLevel::Notice).next().is_none());
    let created = iiko.created().await;
    let items = &created[0].delivery.items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_id.as_str(), "P2");
    assert_eq!(items[1].product_id.as_str(), "P1");
    assert_eq!(items[1].product_size_id.as_ref().map(|s| s.as_str()), Some("S2"));
}

#[tokio::test]
async fn test_failed_order_is_logged_and_still_sent() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1013);
    order.status = OrderStatus::Failed;
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    assert_eq!(
        logs.messages(LogLevel::Error).collect::<Vec<_>>(),
        vec!["Order 1013 has status 'failed'."]
    );
    assert_eq!(iiko.created().await.len(), 1);
}

#[tokio::test]
async fn test_empty_phone_is_logged_and_still_sent() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1014);
    order.billing.phone = "n/a".to_string();
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    assert_eq!(
        logs.messages(LogLevel::Error).collect::<Vec<_>>(),
        vec!["User phone is empty."]
    );
    assert_eq!(iiko.created().await[0].delivery.phone, "");
}

#[tokio::test]
async fn test_saved_selection_overrides_defaults() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let organization_id = OrganizationId::new("9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d");
    let terminal_group_id = TerminalGroupId::new("2b3c4d5e-6f70-4182-93a4-b5c6d7e8f901");
    store
        .save_pos_selection(&PosSelection {
            organization_id: Some(organization_id.clone()),
            terminal_group_id: Some(terminal_group_id.clone()),
            ..PosSelection::default()
        })
        .await
        .expect("save selection");

    let mut order = order_snapshot(1015);
    order.line_items = vec![line_item(&store, "P2", 1).await];

    let mut logs = Logs::new();
    exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let created = iiko.created().await;
    assert_eq!(created[0].organization_id, organization_id);
    assert_eq!(created[0].terminal_group_id, terminal_group_id);
}

#[tokio::test]
async fn test_export_without_organization_fails() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    let defaults = ExportDefaults::default();

    let mut order = order_snapshot(1016);
    order.line_items = vec![LineItem::new("Cola", ProductId::new(1), 1)];

    let mut logs = Logs::new();
    let result = exporter(&iiko, &store, &defaults)
        .export_delivery(&order, &mut logs)
        .await;

    assert!(matches!(result, Err(ExportError::NoOrganization)));
    assert!(iiko.created().await.is_empty());
}

#[tokio::test]
async fn test_manual_export_of_unknown_order_fails() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    let defaults = export_defaults();

    let mut logs = Logs::new();
    let result = exporter(&iiko, &store, &defaults)
        .export_order_manually(OrderId::new(404), &mut logs)
        .await;

    assert!(matches!(result, Err(ExportError::OrderNotFound(id)) if id == OrderId::new(404)));
}

// =============================================================================
// Delivery lookup
// =============================================================================

#[tokio::test]
async fn test_check_before_export_fails() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    let defaults = export_defaults();
    store.save_order(&order_snapshot(1017)).await.expect("save order");

    let result = exporter(&iiko, &store, &defaults)
        .check_created_delivery(OrderId::new(1017))
        .await;

    assert!(matches!(result, Err(ExportError::MissingPosOrderId(_))));
}

#[tokio::test]
async fn test_check_after_export_finds_delivery() {
    let iiko = FakeIiko::new();
    let store = MemoryStore::new();
    import_menu(&iiko, &store).await;
    let defaults = export_defaults();

    let mut order = order_snapshot(1018);
    order.line_items = vec![line_item(&store, "P2", 1).await];
    let exporter = exporter(&iiko, &store, &defaults);

    let mut logs = Logs::new();
    exporter
        .export_delivery(&order, &mut logs)
        .await
        .expect("export failed");

    let response = exporter
        .check_created_delivery(OrderId::new(1018))
        .await
        .expect("check failed");
    assert_eq!(response.orders.len(), 1);
    assert_eq!(response.orders[0].creation_status.as_deref(), Some("Success"));
    assert_eq!(
        response.orders[0].id.as_str(),
        iiko.created().await[0].delivery.id
    );
}
