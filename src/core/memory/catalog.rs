//! `CatalogLookup` and catalog administration for the in-memory backend

use super::MemoryStore;
use crate::core::traits::CatalogLookup;
use crate::types::{CatalogItem, CoinError, Coins};

impl MemoryStore {
    /// Add an item or change the price of an existing one
    ///
    /// An existing item keeps its id, so recorded orders still resolve to it.
    pub fn upsert_item(&self, name: &str, price: Coins) -> Result<CatalogItem, CoinError> {
        if price <= 0 {
            return Err(CoinError::invalid_price(name, price));
        }
        Ok(self.put_item(name, price))
    }

    /// All catalog items, sorted by name
    pub fn items(&self) -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> = self
            .tables()
            .items
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    pub(crate) fn put_item(&self, name: &str, price: Coins) -> CatalogItem {
        let tables = self.tables();
        let mut entry = tables.items.entry(name.to_string()).or_insert_with(|| {
            let id = tables.next_item_id();
            tables.item_names.insert(id, name.to_string());
            CatalogItem {
                id,
                name: name.to_string(),
                price,
            }
        });
        entry.price = price;
        entry.value().clone()
    }
}

impl CatalogLookup for MemoryStore {
    fn get_by_name(&self, name: &str) -> Result<CatalogItem, CoinError> {
        self.tables()
            .items
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CoinError::item_not_found(name))
    }
}
