//! Coin transfers between accounts
//!
//! A transfer debits the sender, credits the receiver and appends the
//! sent/received entry pair inside one unit of work. Both rows are locked in
//! ascending account id order, so two opposing transfers between the same
//! pair of accounts contend on the same first lock instead of each holding
//! one side.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. `amount > 0` (`InvalidAmount`)
//! 2. receiver identity resolves (`ReceiverNotFound`)
//! 3. receiver differs from sender (`SelfTransferRejected`)
//! 4. both rows lock (`AccountNotFound`, `ReceiverNotFound`, `Busy`)
//! 5. sender balance covers the amount (`InsufficientFunds`)

use crate::core::stage::{log_abort, UnitStage};
use crate::core::traits::{AccountStore, LedgerRecorder, UnitOfWork};
use crate::types::{Account, AccountId, CoinError, Coins};
use std::sync::Arc;
use tracing::{info, warn};

/// Moves coins between accounts
pub struct TransferCoordinator<A, L> {
    accounts: Arc<A>,
    ledger: Arc<L>,
}

impl<A, L> Clone for TransferCoordinator<A, L> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<A, L> TransferCoordinator<A, L>
where
    A: AccountStore,
    L: LedgerRecorder<A::Unit>,
{
    pub fn new(accounts: Arc<A>, ledger: Arc<L>) -> Self {
        Self { accounts, ledger }
    }

    /// Send `amount` coins from account `from` to the holder of `to_identity`
    pub fn send_coin(
        &self,
        from: AccountId,
        to_identity: &str,
        amount: Coins,
    ) -> Result<(), CoinError> {
        let receiver = self
            .resolve_receiver(from, to_identity, amount)
            .inspect_err(|e| {
                warn!(from, to = to_identity, amount, error = %e, "transfer rejected");
            })?;

        let mut unit = self.accounts.begin();
        let mut stage = UnitStage::Idle;

        match self.move_in_unit(&mut unit, &mut stage, from, &receiver, amount) {
            Ok((sender_balance, receiver_balance)) => {
                unit.commit().inspect_err(|e| log_abort("transfer", &mut stage, e))?;
                stage = UnitStage::Committed;
                info!(
                    from,
                    to = receiver.id,
                    amount,
                    sender_balance,
                    receiver_balance,
                    stage = %stage,
                    "transfer committed"
                );
                Ok(())
            }
            Err(e) => {
                unit.abort();
                log_abort("transfer", &mut stage, &e);
                Err(e)
            }
        }
    }

    /// Checks that need no lock
    fn resolve_receiver(
        &self,
        from: AccountId,
        to_identity: &str,
        amount: Coins,
    ) -> Result<Account, CoinError> {
        if amount <= 0 {
            return Err(CoinError::invalid_amount(amount));
        }

        let receiver = self
            .accounts
            .get_by_identity(to_identity)
            .map_err(|e| match e {
                CoinError::IdentityNotFound { .. } => CoinError::receiver_not_found(to_identity),
                other => other,
            })?;

        if receiver.id == from {
            return Err(CoinError::self_transfer(from));
        }
        Ok(receiver)
    }

    /// Returns the staged sender and receiver balances
    fn move_in_unit(
        &self,
        unit: &mut A::Unit,
        stage: &mut UnitStage,
        from: AccountId,
        receiver: &Account,
        amount: Coins,
    ) -> Result<(Coins, Coins), CoinError> {
        let to = receiver.id;
        let (first, second) = if from < to { (from, to) } else { (to, from) };

        let first_row = self.lock_party(unit, first, receiver)?;
        let second_row = self.lock_party(unit, second, receiver)?;
        let (sender, recipient) = if first == from {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };
        *stage = UnitStage::LockAcquired;

        if !sender.can_afford(amount) {
            return Err(CoinError::insufficient_funds(from, sender.balance, amount));
        }
        *stage = UnitStage::Validated;

        let sender_balance = sender
            .balance
            .checked_sub(amount)
            .ok_or_else(|| CoinError::arithmetic_overflow("transfer debit", from))?;
        let receiver_balance = recipient
            .balance
            .checked_add(amount)
            .ok_or_else(|| CoinError::arithmetic_overflow("transfer credit", to))?;

        self.accounts.update_balance(unit, from, sender_balance)?;
        self.accounts.update_balance(unit, to, receiver_balance)?;
        self.ledger.record_transfer_pair(unit, from, to, amount)?;
        *stage = UnitStage::Mutated;

        Ok((sender_balance, receiver_balance))
    }

    fn lock_party(
        &self,
        unit: &mut A::Unit,
        id: AccountId,
        receiver: &Account,
    ) -> Result<Account, CoinError> {
        self.accounts.lock_for_update(unit, id).map_err(|e| match e {
            // The receiver vanished between resolution and locking
            CoinError::AccountNotFound { account } if account == receiver.id => {
                CoinError::receiver_not_found(&receiver.identity)
            }
            other => other,
        })
    }
}
