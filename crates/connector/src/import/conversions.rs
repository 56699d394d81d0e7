//! Conversions from cached nomenclature to storefront catalog records.

use std::collections::HashMap;

use iiko_connector_core::{CategoryId, GroupId, ModifierId, Price, ProductId};

use crate::iiko::{Group, Product, Size};
use crate::nomenclature::SimpleGroup;
use crate::store::{CategoryUpsert, ProductKind, ProductUpsert, VariationAttribute, VariationUpsert};

pub const SIZE_ATTRIBUTE: &str = "Size";
pub const DEFAULT_MODIFIER_ATTRIBUTE: &str = "Modifier";

/// Lookup tables built once per import run.
#[derive(Debug, Default)]
pub struct Lookups<'a> {
    pub modifiers: HashMap<&'a str, &'a Product>,
    pub sizes: HashMap<&'a str, &'a Size>,
    pub group_names: HashMap<&'a str, &'a str>,
}

impl<'a> Lookups<'a> {
    pub fn new(modifiers: &'a [Product], sizes: &'a [Size], simple_groups: &'a [SimpleGroup]) -> Self {
        Self {
            modifiers: modifiers.iter().map(|m| (m.id.as_str(), m)).collect(),
            sizes: sizes.iter().map(|s| (s.id.as_str(), s)).collect(),
            group_names: simple_groups
                .iter()
                .map(|g| (g.id.as_str(), g.name.as_str()))
                .collect(),
        }
    }

    fn attribute_name(&self, group_id: Option<&GroupId>) -> String {
        group_id
            .and_then(|id| self.group_names.get(id.as_str()))
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_MODIFIER_ATTRIBUTE)
            .to_string()
    }
}

pub fn category(group: &Group) -> CategoryUpsert {
    CategoryUpsert {
        pos_group_id: group.id.clone(),
        name: group.name.trim().to_string(),
        description: non_blank(group.description.as_deref()),
        sort_order: group.order,
    }
}

pub fn product(
    product: &Product,
    category_id: CategoryId,
    kind: ProductKind,
) -> ProductUpsert {
    ProductUpsert {
        pos_product_id: product.id.clone(),
        category_id,
        name: product.name.trim().to_string(),
        sku: non_blank(product.code.as_deref()),
        description: non_blank(product.description.as_deref()),
        kind,
        price: match kind {
            ProductKind::Simple => base_price(product),
            ProductKind::Variable => None,
        },
        sort_order: product.order,
    }
}

/// Price of the size-less entry, or of the only entry.
pub fn base_price(product: &Product) -> Option<Price> {
    let entry = product
        .size_prices
        .iter()
        .find(|sp| sp.size_id.is_none())
        .or_else(|| product.size_prices.first())?;
    entry.price.current_price.map(Price::new)
}

/// A modifier that resolved in the modifiers cache.
#[derive(Debug, Clone)]
struct ResolvedModifier<'a> {
    id: ModifierId,
    group_id: Option<GroupId>,
    product: &'a Product,
}

/// Plan the variations of a product.
///
/// An empty result means the product is imported as a simple product.
pub fn variations(product: &Product, product_id: ProductId, lookups: &Lookups<'_>) -> Vec<VariationUpsert> {
    let sizes: Vec<(&Size, Option<Price>)> = product
        .size_prices
        .iter()
        .filter_map(|sp| {
            let size = lookups.sizes.get(sp.size_id.as_ref()?.as_str())?;
            Some((*size, sp.price.current_price.map(Price::new)))
        })
        .collect();

    let modifiers = resolve_modifiers(product, lookups);
    let base = base_price(product);

    let size_attribute = |size: &Size| VariationAttribute::new(SIZE_ATTRIBUTE, size.name.trim());
    let modifier_attribute = |m: &ResolvedModifier<'_>| {
        VariationAttribute::new(lookups.attribute_name(m.group_id.as_ref()), m.product.name.trim())
    };

    match (sizes.is_empty(), modifiers.is_empty()) {
        (true, true) => Vec::new(),
        (false, true) => sizes
            .iter()
            .map(|(size, price)| VariationUpsert {
                product_id,
                attributes: vec![size_attribute(*size)],
                price: *price,
                pos_size_id: Some(size.id.clone()),
                pos_modifier_id: None,
                pos_modifier_group_id: None,
            })
            .collect(),
        (true, false) => modifiers
            .iter()
            .map(|m| VariationUpsert {
                product_id,
                attributes: vec![modifier_attribute(m)],
                price: add(base, base_price(m.product)),
                pos_size_id: None,
                pos_modifier_id: Some(m.id.clone()),
                pos_modifier_group_id: m.group_id.clone(),
            })
            .collect(),
        (false, false) => sizes
            .iter()
            .flat_map(|(size, price)| {
                modifiers.iter().map(move |m| VariationUpsert {
                    product_id,
                    attributes: vec![size_attribute(*size), modifier_attribute(m)],
                    price: add(*price, base_price(m.product)),
                    pos_size_id: Some(size.id.clone()),
                    pos_modifier_id: Some(m.id.clone()),
                    pos_modifier_group_id: m.group_id.clone(),
                })
            })
            .collect(),
    }
}

/// Direct modifiers followed by the children of group modifiers, first
/// occurrence wins.
fn resolve_modifiers<'a>(product: &Product, lookups: &Lookups<'a>) -> Vec<ResolvedModifier<'a>> {
    let direct = product.modifiers.iter().map(|m| (&m.id, None));
    let grouped = product
        .group_modifiers
        .iter()
        .flat_map(|g| g.child_modifiers.iter().map(move |m| (&m.id, Some(&g.id))));

    let mut resolved: Vec<ResolvedModifier<'a>> = Vec::new();
    for (id, group_id) in direct.chain(grouped) {
        if resolved.iter().any(|r| &r.id == id) {
            continue;
        }
        let Some(modifier) = lookups.modifiers.get(id.as_str()) else {
            continue;
        };
        resolved.push(ResolvedModifier {
            id: id.clone(),
            group_id: group_id.cloned().or_else(|| modifier.parent_group.clone()),
            product: *modifier,
        });
    }
    resolved
}

fn add(a: Option<Price>, b: Option<Price>) -> Option<Price> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(Price::new(
            a.unwrap_or(Price::ZERO).amount() + b.unwrap_or(Price::ZERO).amount(),
        )),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
