//! `LedgerRecorder` for the in-memory backend

use super::{MemoryStore, MemoryUnit};
use crate::core::traits::{LedgerRecorder, UnitOfWork};
use crate::types::{AccountId, CoinError, Coins, EntryKind, ItemId, LedgerEntry, Order};
use chrono::Utc;

impl LedgerRecorder<MemoryUnit> for MemoryStore {
    fn record_order(
        &self,
        unit: &mut MemoryUnit,
        account: AccountId,
        item: ItemId,
        quantity: u32,
        total_price: Coins,
    ) -> Result<(), CoinError> {
        let tables = self.tables();
        if !unit.belongs_to(tables) {
            return Err(CoinError::internal(format!(
                "unit {} belongs to a different store",
                unit.id()
            )));
        }
        if !tables.accounts.contains_key(&account) {
            return Err(CoinError::account_not_found(account));
        }
        if quantity == 0 || total_price < 0 {
            return Err(CoinError::internal(format!(
                "malformed order: quantity {}, total price {}",
                quantity, total_price
            )));
        }
        let item_name = tables
            .item_names
            .get(&item)
            .map(|name| name.value().clone())
            .ok_or_else(|| CoinError::internal(format!("order references unknown item {}", item)))?;

        unit.stage_order(Order {
            id: tables.next_order_id(),
            account,
            item,
            item_name,
            quantity,
            total_price,
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn record_transfer_pair(
        &self,
        unit: &mut MemoryUnit,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<(), CoinError> {
        let tables = self.tables();
        if !unit.belongs_to(tables) {
            return Err(CoinError::internal(format!(
                "unit {} belongs to a different store",
                unit.id()
            )));
        }
        if amount <= 0 {
            return Err(CoinError::invalid_amount(amount));
        }
        if from == to {
            return Err(CoinError::self_transfer(from));
        }
        for account in [from, to] {
            if !tables.accounts.contains_key(&account) {
                return Err(CoinError::account_not_found(account));
            }
        }

        let created_at = Utc::now();
        unit.stage_entry(LedgerEntry {
            id: tables.next_entry_id(),
            account: from,
            amount,
            kind: EntryKind::TransferSent,
            counterparty: Some(to),
            created_at,
        });
        unit.stage_entry(LedgerEntry {
            id: tables.next_entry_id(),
            account: to,
            amount,
            kind: EntryKind::TransferReceived,
            counterparty: Some(from),
            created_at,
        });
        Ok(())
    }

    fn list_orders_by_account(&self, account: AccountId) -> Result<Vec<Order>, CoinError> {
        let tables = self.tables();
        let _gate = tables.read_gate();
        Ok(tables
            .orders
            .get(&account)
            .map(|rows| rows.value().iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    fn list_entries_by_account(&self, account: AccountId) -> Result<Vec<LedgerEntry>, CoinError> {
        let tables = self.tables();
        let _gate = tables.read_gate();
        Ok(tables
            .entries
            .get(&account)
            .map(|rows| rows.value().iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}
