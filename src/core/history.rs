//! Read-only account summaries
//!
//! `HistoryAssembler` joins an account's balance, its orders grouped into an
//! inventory, and its transfer entries split by direction. The balance and
//! the orders are required; a ledger-entry failure degrades to an empty
//! history rather than failing the whole summary.

use crate::core::traits::{AccountStore, LedgerRecorder};
use crate::types::{
    AccountId, CoinError, CoinHistory, EntryKind, InventoryItem, LedgerEntry, Order,
    ReceivedCoins, SentCoins, Summary,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct HistoryAssembler<A, L> {
    accounts: Arc<A>,
    ledger: Arc<L>,
}

impl<A, L> Clone for HistoryAssembler<A, L> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<A, L> HistoryAssembler<A, L>
where
    A: AccountStore,
    L: LedgerRecorder<A::Unit>,
{
    pub fn new(accounts: Arc<A>, ledger: Arc<L>) -> Self {
        Self { accounts, ledger }
    }

    /// Build the summary of `account`
    ///
    /// Inventory is sorted by item name. Both history lists keep the
    /// ledger's most-recent-first order.
    pub fn summarize(&self, account: AccountId) -> Result<Summary, CoinError> {
        let owner = self.accounts.get_by_id(account)?;

        let orders = self
            .ledger
            .list_orders_by_account(account)
            .inspect_err(|e| error!(account, error = %e, "orders unavailable"))?;

        let coin_history = match self.ledger.list_entries_by_account(account) {
            Ok(entries) => self.split_history(&entries),
            Err(e) => {
                warn!(account, error = %e, "ledger entries unavailable, history left empty");
                CoinHistory::default()
            }
        };

        Ok(Summary {
            account: owner.id,
            identity: owner.identity,
            coins: owner.balance,
            inventory: group_inventory(&orders),
            coin_history,
        })
    }

    fn split_history(&self, entries: &[LedgerEntry]) -> CoinHistory {
        let mut identities: HashMap<AccountId, Option<String>> = HashMap::new();
        let mut history = CoinHistory::default();

        for entry in entries {
            let counterparty = entry.counterparty.and_then(|id| {
                identities
                    .entry(id)
                    .or_insert_with(|| self.counterparty_identity(id))
                    .clone()
            });

            match entry.kind {
                EntryKind::TransferReceived => history.received.push(ReceivedCoins {
                    from_user: counterparty,
                    amount: entry.amount,
                }),
                EntryKind::TransferSent => history.sent.push(SentCoins {
                    to_user: counterparty,
                    amount: entry.amount,
                }),
            }
        }
        history
    }

    fn counterparty_identity(&self, id: AccountId) -> Option<String> {
        match self.accounts.get_by_id(id) {
            Ok(account) => Some(account.identity),
            Err(e) => {
                debug!(counterparty = id, error = %e, "counterparty unresolved");
                None
            }
        }
    }
}

/// Sum order quantities per item name, sorted by name
fn group_inventory(orders: &[Order]) -> Vec<InventoryItem> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for order in orders {
        *counts.entry(order.item_name.as_str()).or_default() += order.quantity;
    }
    counts
        .into_iter()
        .map(|(name, quantity)| InventoryItem {
            name: name.to_string(),
            quantity,
        })
        .collect()
}
