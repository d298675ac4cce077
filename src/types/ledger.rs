//! Ledger records: purchase orders and transfer entries
//!
//! Both record kinds are append-only. They reference accounts and items by
//! id only; ownership of the referenced rows stays with the store.

use super::account::{AccountId, Coins};
use super::catalog::ItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order identifier
pub type OrderId = i64;

/// Ledger entry identifier
pub type EntryId = i64;

/// One purchase of one catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account: AccountId,
    pub item: ItemId,

    /// Item name resolved from the catalog when the order is listed
    pub item_name: String,

    /// Always 1 for orders created by a purchase
    pub quantity: u32,
    pub total_price: Coins,
    pub created_at: DateTime<Utc>,
}

/// Which side of a transfer an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Coins left the owning account
    TransferSent,
    /// Coins arrived on the owning account
    TransferReceived,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::TransferSent => "transfer_sent",
            EntryKind::TransferReceived => "transfer_received",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a transfer, recorded on the account it affected
///
/// `amount` is the transferred quantity and is always positive; the
/// direction lives in `kind`. Use [`LedgerEntry::signed_amount`] for the
/// effect on the owning balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub account: AccountId,
    pub amount: Coins,
    pub kind: EntryKind,
    pub counterparty: Option<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Effect of this entry on the owning account's balance
    pub fn signed_amount(&self) -> Coins {
        match self.kind {
            EntryKind::TransferSent => -self.amount,
            EntryKind::TransferReceived => self.amount,
        }
    }
}
