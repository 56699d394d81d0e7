//! Integration tests for the nomenclature import.
//!
//! The nomenclature is fetched from [`FakeIiko`] into a fresh cache and
//! imported into the in-memory catalog.

use std::sync::Arc;
use std::time::Duration;

use iiko_connector::import::{ImportError, Importer};
use iiko_connector::iiko::{Group, Nomenclature, Product, SizePrice};
use iiko_connector::logs::{LogLevel, Logs};
use iiko_connector::nomenclature::NomenclatureCache;
use iiko_connector::store::{CatalogStore, MemoryStore, ProductKind, SettingsStore, VariationAttribute};
use iiko_connector_core::{GroupId, OrganizationId, Price};
use iiko_connector_integration_tests::{FakeIiko, ORGANIZATION_ID};
use rust_decimal::Decimal;

async fn refreshed_cache(iiko: &FakeIiko) -> NomenclatureCache {
    let cache = NomenclatureCache::new(Duration::from_secs(60));
    cache
        .refresh(iiko, &OrganizationId::new(ORGANIZATION_ID))
        .await
        .expect("refresh failed");
    cache
}

fn price(amount: i64) -> Option<Price> {
    Some(Price::new(Decimal::from(amount)))
}

// =============================================================================
// Groups
// =============================================================================

#[tokio::test]
async fn test_group_becomes_category() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    let categories = Importer::new(&cache, &store, &store)
        .import_groups(Some(&[GroupId::new("G1")]), &mut logs)
        .await
        .expect("group import failed");

    assert_eq!(categories.len(), 1);
    let stored = store.categories().await.expect("categories");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Pizza");
    assert_eq!(stored[0].pos_group_id, GroupId::new("G1"));
    assert_eq!(categories.get(&stored[0].id), Some(&GroupId::new("G1")));
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_chosen_groups_are_saved_by_name() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    Importer::new(&cache, &store, &store)
        .import_nomenclature(Some(&[GroupId::new("G1"), GroupId::new("G2")]), &mut logs)
        .await
        .expect("import failed");

    let saved = store.chosen_groups().await.expect("chosen groups");
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.get("Pizza"), Some(&GroupId::new("G1")));
    assert_eq!(saved.get("Drinks"), Some(&GroupId::new("G2")));
}

#[tokio::test]
async fn test_rerun_without_selection_uses_saved_groups() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let importer = Importer::new(&cache, &store, &store);

    let mut logs = Logs::new();
    importer
        .import_nomenclature(Some(&[GroupId::new("G2")]), &mut logs)
        .await
        .expect("first import failed");

    let mut logs = Logs::new();
    let summary = importer
        .import_nomenclature(None, &mut logs)
        .await
        .expect("second import failed");

    assert_eq!(summary.imported_groups, 1);
    assert_eq!(summary.imported_products, 1);
    assert_eq!(store.categories().await.expect("categories").len(), 1);
}

#[tokio::test]
async fn test_import_before_refresh_fails() {
    let cache = NomenclatureCache::new(Duration::from_secs(60));
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    let result = Importer::new(&cache, &store, &store)
        .import_nomenclature(Some(&[GroupId::new("G1")]), &mut logs)
        .await;

    assert!(matches!(result, Err(ImportError::EmptyCache("groups"))));
    assert!(store.categories().await.expect("categories").is_empty());
}

#[tokio::test]
async fn test_only_unknown_groups_fails() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    let result = Importer::new(&cache, &store, &store)
        .import_nomenclature(Some(&[GroupId::new("G404")]), &mut logs)
        .await;

    assert!(matches!(result, Err(ImportError::NoImportedGroups)));
    assert_eq!(
        logs.messages(LogLevel::Warning).collect::<Vec<_>>(),
        vec!["Group G404 is not in the cached nomenclature."]
    );
}

#[tokio::test]
async fn test_failed_run_keeps_saved_selection() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let importer = Importer::new(&cache, &store, &store);

    let mut logs = Logs::new();
    importer
        .import_nomenclature(Some(&[GroupId::new("G1")]), &mut logs)
        .await
        .expect("first import failed");

    let mut logs = Logs::new();
    let result = importer
        .import_nomenclature(Some(&[GroupId::new("G404")]), &mut logs)
        .await;
    assert!(matches!(result, Err(ImportError::NoImportedGroups)));

    let saved = store.chosen_groups().await.expect("chosen groups");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved.get("Pizza"), Some(&GroupId::new("G1")));

    let mut logs = Logs::new();
    let summary = importer
        .import_nomenclature(None, &mut logs)
        .await
        .expect("rerun from saved selection failed");
    assert_eq!(summary.imported_groups, 1);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_single_product_is_linked_to_its_category() {
    let mut iiko = FakeIiko::new();
    iiko.nomenclature = Nomenclature {
        groups: vec![Group::new("G1", "Pizza")],
        products: vec![Product::new("P1", "Margherita", "G1")],
        sizes: Vec::new(),
        revision: 1,
    };
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    let summary = Importer::new(&cache, &store, &store)
        .import_nomenclature(Some(&[GroupId::new("G1")]), &mut logs)
        .await
        .expect("import failed");

    assert_eq!(summary.imported_groups, 1);
    assert_eq!(summary.imported_products, 1);

    let category = &store.categories().await.expect("categories")[0];
    let products = store.products().await.expect("products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Margherita");
    assert_eq!(products[0].pos_product_id.as_str(), "P1");
    assert_eq!(products[0].category_id, category.id);
    assert_eq!(products[0].kind, ProductKind::Simple);
}

#[tokio::test]
async fn test_products_outside_imported_groups_are_skipped() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    let summary = Importer::new(&cache, &store, &store)
        .import_nomenclature(Some(&[GroupId::new("G1")]), &mut logs)
        .await
        .expect("import failed");

    assert_eq!(summary.imported_products, 2);
    let mut names: Vec<String> = store
        .products()
        .await
        .expect("products")
        .into_iter()
        .map(|p| p.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Margherita", "Pepperoni"]);
}

#[tokio::test]
async fn test_sizes_become_variations() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    Importer::new(&cache, &store, &store)
        .import_nomenclature(Some(&[GroupId::new("G1")]), &mut logs)
        .await
        .expect("import failed");

    let margherita = store
        .products()
        .await
        .expect("products")
        .into_iter()
        .find(|p| p.pos_product_id.as_str() == "P1")
        .expect("P1 imported");
    assert_eq!(margherita.kind, ProductKind::Variable);
    assert_eq!(margherita.price, None);

    let mut variations = store.variations(margherita.id).await.expect("variations");
    variations.sort_by_key(|v| v.price);
    assert_eq!(variations.len(), 2);
    assert_eq!(variations[0].attributes, vec![VariationAttribute::new("Size", "Small")]);
    assert_eq!(variations[0].price, price(400));
    assert_eq!(variations[1].attributes, vec![VariationAttribute::new("Size", "Large")]);
    assert_eq!(variations[1].price, price(550));
    assert!(variations.iter().all(|v| v.pos_modifier_id.is_none()));
}

#[tokio::test]
async fn test_group_modifier_becomes_variation() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    Importer::new(&cache, &store, &store)
        .import_nomenclature(Some(&[GroupId::new("G1")]), &mut logs)
        .await
        .expect("import failed");

    let pepperoni = store
        .products()
        .await
        .expect("products")
        .into_iter()
        .find(|p| p.pos_product_id.as_str() == "P3")
        .expect("P3 imported");
    assert_eq!(pepperoni.kind, ProductKind::Variable);

    let variations = store.variations(pepperoni.id).await.expect("variations");
    assert_eq!(variations.len(), 1);
    let cheese = &variations[0];
    assert_eq!(cheese.attributes, vec![VariationAttribute::new("Extras", "Cheese")]);
    assert_eq!(cheese.price, price(550));
    assert_eq!(cheese.pos_size_id, None);
    assert_eq!(cheese.pos_modifier_id.as_ref().map(|id| id.as_str()), Some("M1"));
    assert_eq!(cheese.pos_modifier_group_id, Some(GroupId::new("MG1")));
}

#[tokio::test]
async fn test_good_without_sizes_is_simple() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let mut logs = Logs::new();

    Importer::new(&cache, &store, &store)
        .import_nomenclature(Some(&[GroupId::new("G2")]), &mut logs)
        .await
        .expect("import failed");

    let products = store.products().await.expect("products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Cola");
    assert_eq!(products[0].kind, ProductKind::Simple);
    assert_eq!(products[0].price, price(100));
    assert!(store.variations(products[0].id).await.expect("variations").is_empty());
}

#[tokio::test]
async fn test_import_is_idempotent() {
    let iiko = FakeIiko::new();
    let cache = refreshed_cache(&iiko).await;
    let store = MemoryStore::new();
    let importer = Importer::new(&cache, &store, &store);
    let chosen = [GroupId::new("G1"), GroupId::new("G2")];

    let mut logs = Logs::new();
    let first = importer
        .import_nomenclature(Some(&chosen), &mut logs)
        .await
        .expect("first import failed");
    let categories = store.categories().await.expect("categories");
    let products = store.products().await.expect("products");

    let mut logs = Logs::new();
    let second = importer
        .import_nomenclature(Some(&chosen), &mut logs)
        .await
        .expect("second import failed");

    assert_eq!(first, second);
    assert_eq!(store.categories().await.expect("categories"), categories);
    assert_eq!(store.products().await.expect("products"), products);
    for product in &products {
        let count = store.variations(product.id).await.expect("variations").len();
        let expected = match product.pos_product_id.as_str() {
            "P1" => 2,
            "P3" => 1,
            _ => 0,
        };
        assert_eq!(count, expected, "variations of {}", product.name);
    }
}

#[tokio::test]
async fn test_renamed_product_is_updated_in_place() {
    let mut iiko = FakeIiko::new();
    let store = Arc::new(MemoryStore::new());
    let chosen = [GroupId::new("G2")];

    let cache = refreshed_cache(&iiko).await;
    let mut logs = Logs::new();
    Importer::new(&cache, store.as_ref(), store.as_ref())
        .import_nomenclature(Some(&chosen), &mut logs)
        .await
        .expect("first import failed");

    for product in &mut iiko.nomenclature.products {
        if product.id.as_str() == "P2" {
            product.name = "Cola Zero".to_string();
            product.size_prices = vec![SizePrice {
                size_id: None,
                price: iiko_connector::iiko::PriceInfo {
                    current_price: Some(Decimal::from(120)),
                    is_included_in_menu: true,
                },
            }];
        }
    }
    let cache = refreshed_cache(&iiko).await;
    let mut logs = Logs::new();
    Importer::new(&cache, store.as_ref(), store.as_ref())
        .import_nomenclature(Some(&chosen), &mut logs)
        .await
        .expect("second import failed");

    let products = store.products().await.expect("products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Cola Zero");
    assert_eq!(products[0].price, price(120));
}

#[tokio::test]
async fn test_dropped_size_and_modifier_variations_are_removed() {
    let mut iiko = FakeIiko::new();
    let store = Arc::new(MemoryStore::new());
    let chosen = [GroupId::new("G1")];

    let cache = refreshed_cache(&iiko).await;
    let mut logs = Logs::new();
    Importer::new(&cache, store.as_ref(), store.as_ref())
        .import_nomenclature(Some(&chosen), &mut logs)
        .await
        .expect("first import failed");

    for product in &mut iiko.nomenclature.products {
        match product.id.as_str() {
            "P1" => product
                .size_prices
                .retain(|sp| sp.size_id.as_ref().map(|id| id.as_str()) != Some("S2")),
            "P3" => product.group_modifiers.clear(),
            _ => {}
        }
    }
    let cache = refreshed_cache(&iiko).await;
    let mut logs = Logs::new();
    Importer::new(&cache, store.as_ref(), store.as_ref())
        .import_nomenclature(Some(&chosen), &mut logs)
        .await
        .expect("second import failed");

    let products = store.products().await.expect("products");
    let margherita = products
        .iter()
        .find(|p| p.pos_product_id.as_str() == "P1")
        .expect("P1 imported");
    let variations = store.variations(margherita.id).await.expect("variations");
    assert_eq!(variations.len(), 1);
    assert_eq!(variations[0].attributes, vec![VariationAttribute::new("Size", "Small")]);
    assert_eq!(variations[0].price, price(400));

    let pepperoni = products
        .iter()
        .find(|p| p.pos_product_id.as_str() == "P3")
        .expect("P3 imported");
    assert_eq!(pepperoni.kind, ProductKind::Simple);
    assert!(store.variations(pepperoni.id).await.expect("variations").is_empty());
}
