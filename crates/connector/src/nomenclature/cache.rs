//! Cache types for nomenclature lists.

use std::sync::Arc;

use crate::iiko::{Group, Product, Size};

use super::SimpleGroup;

/// One named list per key.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Groups,
    SimpleGroups,
    Dishes,
    Goods,
    Modifiers,
    Sizes,
}

impl CacheKey {
    /// Human-readable list name used in log messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Groups => "groups",
            Self::SimpleGroups => "groups list",
            Self::Dishes => "dishes",
            Self::Goods => "goods",
            Self::Modifiers => "modifiers",
            Self::Sizes => "sizes",
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Groups(Arc<Vec<Group>>),
    SimpleGroups(Arc<Vec<SimpleGroup>>),
    Products(Arc<Vec<Product>>),
    Sizes(Arc<Vec<Size>>),
}
