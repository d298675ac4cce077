//! Identity resolution
//!
//! Maps an external identity string to its account, creating the account
//! with the starting balance on first sight.

use crate::core::traits::AccountStore;
use crate::types::{Account, CoinError, Coins};
use tracing::{debug, info};

/// Look up `identity`, creating its account if it does not exist yet
///
/// Two callers racing on the same new identity both get the same account:
/// the loser of the insert sees `AlreadyExists` and re-reads the winner's row.
pub fn resolve_or_create<A: AccountStore + ?Sized>(
    store: &A,
    identity: &str,
    starting_balance: Coins,
) -> Result<Account, CoinError> {
    match store.get_by_identity(identity) {
        Ok(account) => return Ok(account),
        Err(CoinError::IdentityNotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    match store.create(identity, starting_balance) {
        Ok(account) => {
            info!(
                account = account.id,
                identity,
                balance = account.balance,
                "account created"
            );
            Ok(account)
        }
        Err(CoinError::AlreadyExists { .. }) => {
            debug!(identity, "lost creation race, re-reading account");
            store.get_by_identity(identity)
        }
        Err(e) => Err(e),
    }
}
