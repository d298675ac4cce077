//! Concurrency and atomicity properties of the coin engine
//!
//! Threads are released together through a `Barrier` so that calls on the
//! same account actually overlap. Assertions only rely on outcomes that hold
//! under every interleaving.

use coin_ledger::core::traits::{AccountStore, LedgerRecorder, UnitOfWork};
use coin_ledger::core::{CoinEngine, EngineConfig};
use coin_ledger::types::{AccountId, CoinError, Coins, EntryKind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn engine_with_balance(starting_balance: Coins) -> CoinEngine {
    CoinEngine::in_memory(EngineConfig { starting_balance })
}

fn balance(engine: &CoinEngine, account: AccountId) -> Coins {
    engine.store().get_by_id(account).unwrap().balance
}

/// Retry `call` while it reports `Busy`
fn until_not_busy(mut call: impl FnMut() -> Result<(), CoinError>) -> Result<(), CoinError> {
    loop {
        match call() {
            Err(e) if e.is_retryable() => thread::yield_now(),
            other => return other,
        }
    }
}

fn coins_in_system(engine: &CoinEngine) -> Coins {
    engine
        .store()
        .list()
        .unwrap()
        .iter()
        .map(|account| {
            let spent: Coins = engine
                .store()
                .list_orders_by_account(account.id)
                .unwrap()
                .iter()
                .map(|order| order.total_price)
                .sum();
            account.balance + spent
        })
        .sum()
}

#[test]
fn test_purchase_debits_price_and_records_one_order() {
    let engine = engine_with_balance(1000);
    let account = engine.authenticate("alice@example.com").unwrap();

    engine.buy(account.id, "t-shirt").unwrap();

    assert_eq!(balance(&engine, account.id), 920);
    let orders = engine.store().list_orders_by_account(account.id).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].quantity, 1);
    assert_eq!(orders[0].total_price, 80);
}

#[test]
fn test_transfer_moves_coins_with_entry_pair() {
    let engine = engine_with_balance(1000);
    let sender = engine.authenticate("alice@example.com").unwrap();
    let receiver = engine.store().create("bob@example.com", 500).unwrap();

    engine.send_coin(sender.id, "bob@example.com", 100).unwrap();

    assert_eq!(balance(&engine, sender.id), 900);
    assert_eq!(balance(&engine, receiver.id), 600);

    let sent = engine.store().list_entries_by_account(sender.id).unwrap();
    let received = engine.store().list_entries_by_account(receiver.id).unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!((sent[0].kind, sent[0].amount), (EntryKind::TransferSent, 100));
    assert_eq!(received.len(), 1);
    assert_eq!(
        (received[0].kind, received[0].amount),
        (EntryKind::TransferReceived, 100)
    );
}

#[test]
fn test_insufficient_funds_is_repeatable_and_changes_nothing() {
    let engine = engine_with_balance(50);
    let account = engine.authenticate("alice@example.com").unwrap();

    let first = engine.buy(account.id, "t-shirt").unwrap_err();
    let second = engine.buy(account.id, "t-shirt").unwrap_err();

    assert_eq!(first, second);
    assert!(matches!(first, CoinError::InsufficientFunds { .. }));
    assert_eq!(balance(&engine, account.id), 50);
    assert!(engine
        .store()
        .list_orders_by_account(account.id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_self_transfer_rejected_without_change() {
    let engine = engine_with_balance(1000);
    let account = engine.authenticate("alice@example.com").unwrap();

    let result = engine.send_coin(account.id, "alice@example.com", 50);

    assert_eq!(result.unwrap_err(), CoinError::self_transfer(account.id));
    assert_eq!(balance(&engine, account.id), 1000);
    assert!(engine
        .store()
        .list_entries_by_account(account.id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_concurrent_purchases_never_both_succeed() {
    for _ in 0..200 {
        let engine = engine_with_balance(100);
        let account = engine.authenticate("alice@example.com").unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = engine.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    engine.buy(account.id, "t-shirt")
                })
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "results: {:?}", results);
        for result in &results {
            if let Err(e) = result {
                assert!(
                    matches!(
                        e,
                        CoinError::Busy { .. } | CoinError::InsufficientFunds { .. }
                    ),
                    "unexpected error: {}",
                    e
                );
            }
        }
        assert_eq!(balance(&engine, account.id), 20);
        assert_eq!(
            engine
                .store()
                .list_orders_by_account(account.id)
                .unwrap()
                .len(),
            1
        );
        assert!(!engine.store().is_locked(account.id));
    }
}

#[test]
fn test_opposite_transfers_conserve_coins() {
    let engine = engine_with_balance(1000);
    let alice = engine.authenticate("alice@example.com").unwrap();
    let bob = engine.authenticate("bob@example.com").unwrap();
    let barrier = Arc::new(Barrier::new(2));

    let spawn_sender = |from: AccountId, to: &'static str| {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            let mut sent = 0;
            for _ in 0..500 {
                if until_not_busy(|| engine.send_coin(from, to, 3)).is_ok() {
                    sent += 1;
                }
            }
            sent
        })
    };

    let from_alice = spawn_sender(alice.id, "bob@example.com");
    let from_bob = spawn_sender(bob.id, "alice@example.com");
    let alice_sent: Coins = from_alice.join().unwrap();
    let bob_sent: Coins = from_bob.join().unwrap();

    let alice_balance = balance(&engine, alice.id);
    let bob_balance = balance(&engine, bob.id);
    assert_eq!(alice_balance + bob_balance, 2000);
    assert_eq!(alice_balance, 1000 - 3 * alice_sent + 3 * bob_sent);

    let summary = engine.summarize(alice.id).unwrap();
    assert_eq!(summary.total_sent(), 3 * alice_sent);
    assert_eq!(summary.total_received(), 3 * bob_sent);
}

#[test]
fn test_balances_never_observed_negative() {
    let engine = engine_with_balance(200);
    let identities = ["a@example.com", "b@example.com", "c@example.com", "d@example.com"];
    for identity in identities {
        engine.authenticate(identity).unwrap();
    }

    let done = Arc::new(AtomicBool::new(false));
    let observations = Arc::new(AtomicUsize::new(0));

    let reader = {
        let engine = engine.clone();
        let done = Arc::clone(&done);
        let observations = Arc::clone(&observations);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                for account in engine.store().list().unwrap() {
                    assert!(account.balance >= 0, "negative balance: {:?}", account);
                }
                observations.fetch_add(1, Ordering::Relaxed);
            }
        })
    };

    let barrier = Arc::new(Barrier::new(identities.len()));
    let workers: Vec<_> = identities
        .iter()
        .enumerate()
        .map(|(index, identity)| {
            let engine = engine.clone();
            let barrier = Arc::clone(&barrier);
            let me = engine.store().get_by_identity(identity).unwrap().id;
            let next = identities[(index + 1) % identities.len()];
            thread::spawn(move || {
                barrier.wait();
                for round in 0..300 {
                    let _ = if round % 2 == 0 {
                        until_not_busy(|| engine.send_coin(me, next, 40))
                    } else {
                        until_not_busy(|| engine.buy(me, "cup"))
                    };
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    done.store(true, Ordering::Release);
    reader.join().unwrap();

    assert!(observations.load(Ordering::Relaxed) > 0);
    assert_eq!(coins_in_system(&engine), 4 * 200);
    for account in engine.store().list().unwrap() {
        assert!(account.balance >= 0);
    }
}

#[test]
fn test_dropped_unit_releases_lock() {
    let engine = engine_with_balance(1000);
    let account = engine.authenticate("alice@example.com").unwrap();

    let mut holder = engine.store().begin();
    engine
        .store()
        .lock_for_update(&mut holder, account.id)
        .unwrap();
    engine
        .store()
        .update_balance(&mut holder, account.id, 1)
        .unwrap();

    assert_eq!(
        engine.buy(account.id, "cup").unwrap_err(),
        CoinError::busy(account.id)
    );

    // Dropping without commit aborts: staged writes vanish, the lock is freed
    drop(holder);
    engine.buy(account.id, "cup").unwrap();
    assert_eq!(balance(&engine, account.id), 980);
}

#[test]
fn test_holder_abort_on_other_thread_unblocks_buyer() {
    let engine = engine_with_balance(1000);
    let account = engine.authenticate("alice@example.com").unwrap();
    let locked = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));

    let holder = {
        let engine = engine.clone();
        let locked = Arc::clone(&locked);
        let release = Arc::clone(&release);
        thread::spawn(move || {
            let mut unit = engine.store().begin();
            engine
                .store()
                .lock_for_update(&mut unit, account.id)
                .unwrap();
            locked.wait();
            release.wait();
            unit.abort();
        })
    };

    locked.wait();
    assert!(engine.buy(account.id, "pen").unwrap_err().is_retryable());
    release.wait();
    holder.join().unwrap();

    until_not_busy(|| engine.buy(account.id, "pen")).unwrap();
    assert_eq!(balance(&engine, account.id), 990);
}

#[test]
fn test_reauthentication_keeps_balance() {
    let engine = engine_with_balance(1000);
    let first = engine.authenticate("alice@example.com").unwrap();
    engine.buy(first.id, "hoody").unwrap();

    let again = engine.authenticate("alice@example.com").unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.balance, 700);
}

#[test]
fn test_concurrent_first_authentication_creates_one_account() {
    let engine = engine_with_balance(1000);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine.authenticate("alice@example.com").unwrap().id
            })
        })
        .collect();
    let ids: Vec<AccountId> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(engine.store().list().unwrap().len(), 1);
}
