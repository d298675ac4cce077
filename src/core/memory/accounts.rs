//! `AccountStore` for the in-memory backend

use super::{MemoryStore, MemoryUnit};
use crate::core::memory::LockOutcome;
use crate::core::traits::{AccountStore, UnitOfWork};
use crate::types::{Account, AccountId, CoinError, Coins};
use std::sync::Arc;
use tracing::debug;

impl MemoryStore {
    fn check_unit(&self, unit: &MemoryUnit) -> Result<(), CoinError> {
        if unit.belongs_to(self.tables()) {
            Ok(())
        } else {
            Err(CoinError::internal(format!(
                "unit {} belongs to a different store",
                unit.id()
            )))
        }
    }
}

impl AccountStore for MemoryStore {
    type Unit = MemoryUnit;

    fn begin(&self) -> MemoryUnit {
        MemoryUnit::open(Arc::clone(self.tables()))
    }

    fn get_by_identity(&self, identity: &str) -> Result<Account, CoinError> {
        let tables = self.tables();
        let _gate = tables.read_gate();
        let id = tables
            .identities
            .get(identity)
            .map(|entry| *entry.value())
            .ok_or_else(|| CoinError::identity_not_found(identity))?;
        tables.account(id)
    }

    fn get_by_id(&self, id: AccountId) -> Result<Account, CoinError> {
        let tables = self.tables();
        let _gate = tables.read_gate();
        tables.account(id)
    }

    fn create(&self, identity: &str, initial_balance: Coins) -> Result<Account, CoinError> {
        if initial_balance < 0 {
            return Err(CoinError::invalid_amount(initial_balance));
        }

        let tables = self.tables();
        let mut created = None;

        // The identity entry stays locked while the account row is inserted,
        // so a concurrent creator either wins outright or sees the collision.
        let _ = tables
            .identities
            .entry(identity.to_string())
            .or_insert_with(|| {
                let account = Account::new(tables.next_account_id(), identity, initial_balance);
                tables.accounts.insert(account.id, account.clone());
                let id = account.id;
                created = Some(account);
                id
            });

        created.ok_or_else(|| CoinError::already_exists(identity))
    }

    fn lock_for_update(&self, unit: &mut MemoryUnit, id: AccountId) -> Result<Account, CoinError> {
        self.check_unit(unit)?;
        if !self.tables().accounts.contains_key(&id) {
            return Err(CoinError::account_not_found(id));
        }

        match unit.try_lock(id) {
            LockOutcome::Busy { holder } => {
                debug!(account = id, unit = unit.id(), holder, "row lock busy");
                return Err(CoinError::busy(id));
            }
            LockOutcome::Acquired => debug!(account = id, unit = unit.id(), "row lock acquired"),
            LockOutcome::AlreadyHeld => {}
        }

        // Read only after the lock is held so the row reflects the last commit
        let mut account = self.tables().account(id)?;
        if let Some(staged) = unit.staged_balance(id) {
            account.balance = staged;
        }
        Ok(account)
    }

    fn update_balance(
        &self,
        unit: &mut MemoryUnit,
        id: AccountId,
        new_balance: Coins,
    ) -> Result<(), CoinError> {
        self.check_unit(unit)?;
        if !self.tables().accounts.contains_key(&id) {
            return Err(CoinError::account_not_found(id));
        }
        if !unit.holds(id) {
            return Err(CoinError::internal(format!(
                "balance update on account {} without its row lock",
                id
            )));
        }
        if new_balance < 0 {
            return Err(CoinError::internal(format!(
                "refusing negative balance {} for account {}",
                new_balance, id
            )));
        }

        unit.stage_balance(id, new_balance);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Account>, CoinError> {
        let tables = self.tables();
        let _gate = tables.read_gate();
        let mut accounts: Vec<Account> = tables
            .accounts
            .iter()
            .map(|row| row.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }
}
