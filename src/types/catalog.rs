//! Catalog reference data

use super::account::Coins;
use serde::{Deserialize, Serialize};

/// Catalog item identifier
pub type ItemId = i64;

/// A purchasable item
///
/// Names are unique across the catalog and prices are always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub price: Coins,
}

/// Merch offered when no catalog file is supplied
pub const DEFAULT_CATALOG: &[(&str, Coins)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];
